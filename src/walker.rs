use ignore::WalkBuilder;
use std::io;
use std::path::PathBuf;

/// Expand the given paths into the files to resolve.
///
/// Directories are walked in name order, skipping hidden entries and anything
/// excluded by gitignore rules. Plain file arguments are passed through.
pub fn walk_paths(paths: &[PathBuf]) -> Vec<io::Result<PathBuf>> {
    let mut all_files = vec![];

    for path in paths {
        if path.is_file() {
            all_files.push(Ok(path.clone()));
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        all_files.push(Ok(entry.into_path()));
                    }
                }
                Err(e) => {
                    all_files.push(Err(io::Error::other(e.to_string())));
                }
            }
        }
    }

    all_files
}
