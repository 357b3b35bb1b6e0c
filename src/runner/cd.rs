//! Working-directory inference from `cd` commands.
//!
//! Every command runs in a fresh shell, so a `cd` only proves that the target
//! exists. The runner applies the change itself when the command succeeds.

use std::path::{Component, Path, PathBuf};

/// What a `cd` command asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    /// `cd` with no argument (Unix shells go home).
    Home,
    /// `cd <dir>` with surrounding quotes removed.
    Dir(String),
}

/// Recognises a trackable `cd` command.
///
/// Returns `None` for anything that is not a `cd`, and for `cd` forms whose
/// effect cannot be inferred from the text (`cd -`, `cd x && make`).
#[must_use]
pub fn parse_cd(command: &str) -> Option<CdTarget> {
    let command = command.trim();
    let (word, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(word, rest)| (word, rest.trim()));
    if !word.eq_ignore_ascii_case("cd") {
        return None;
    }

    let arg = strip_drive_flag(rest);
    if arg.is_empty() {
        return if cfg!(windows) { None } else { Some(CdTarget::Home) };
    }
    if arg == "-" || ["&&", "||", ";", "|"].iter().any(|op| arg.contains(op)) {
        return None;
    }
    Some(CdTarget::Dir(unquote(arg).to_string()))
}

/// `cmd.exe` accepts `cd /d <dir>` to switch drives as well.
fn strip_drive_flag(arg: &str) -> &str {
    match arg.get(..2) {
        Some(flag) if flag.eq_ignore_ascii_case("/d") => {
            let after = &arg[2..];
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                after.trim_start()
            } else {
                arg
            }
        }
        _ => arg,
    }
}

fn unquote(arg: &str) -> &str {
    for quote in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
            return &arg[1..arg.len() - 1];
        }
    }
    arg
}

/// Resolves a `cd` target against `base`, the directory the command ran in.
///
/// `~` and `~/...` expand to `home`. Returns `None` when the target needs a
/// home directory that is unknown.
#[must_use]
pub fn resolve_dir(base: &Path, target: &CdTarget, home: Option<&Path>) -> Option<PathBuf> {
    let path = match target {
        CdTarget::Home => home?.to_path_buf(),
        CdTarget::Dir(dir) if dir == "~" => home?.to_path_buf(),
        CdTarget::Dir(dir) => match dir.strip_prefix("~/") {
            Some(rest) => home?.join(rest),
            None => PathBuf::from(dir),
        },
    };
    let joined = if path.is_absolute() { path } else { base.join(path) };
    Some(normalize(&joined))
}

/// Removes `.` and folds `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_cd_forms() {
        assert_eq!(parse_cd("cd build"), Some(CdTarget::Dir("build".into())));
        assert_eq!(parse_cd("  CD   build  "), Some(CdTarget::Dir("build".into())));
        assert_eq!(parse_cd("cd \"My Projects\""), Some(CdTarget::Dir("My Projects".into())));
        assert_eq!(parse_cd("cd 'a b'"), Some(CdTarget::Dir("a b".into())));
        assert_eq!(parse_cd("cd /d D:\\work"), Some(CdTarget::Dir("D:\\work".into())));
        assert_eq!(parse_cd("cd /data"), Some(CdTarget::Dir("/data".into())));
    }

    #[test]
    fn ignores_non_cd_and_untrackable_forms() {
        assert_eq!(parse_cd("cdrecord -v"), None);
        assert_eq!(parse_cd("echo cd x"), None);
        assert_eq!(parse_cd("cd -"), None);
        assert_eq!(parse_cd("cd src && cargo build"), None);
        assert_eq!(parse_cd("cd a; ls"), None);
        assert_eq!(parse_cd("cd a | cat"), None);
    }

    #[cfg(unix)]
    #[test]
    fn bare_cd_goes_home_on_unix() {
        assert_eq!(parse_cd("cd"), Some(CdTarget::Home));
    }

    #[test]
    fn multibyte_argument_does_not_panic() {
        assert_eq!(parse_cd("cd é"), Some(CdTarget::Dir("é".into())));
    }

    #[cfg(unix)]
    #[test]
    fn resolves_relative_absolute_and_home_targets() {
        let base = Path::new("/work/app");
        let home = Some(Path::new("/home/me"));
        let dir = |d: &str| CdTarget::Dir(d.into());

        assert_eq!(resolve_dir(base, &dir("src"), home), Some(PathBuf::from("/work/app/src")));
        assert_eq!(resolve_dir(base, &dir(".."), home), Some(PathBuf::from("/work")));
        assert_eq!(resolve_dir(base, &dir("./a/../b"), home), Some(PathBuf::from("/work/app/b")));
        assert_eq!(resolve_dir(base, &dir("/etc"), home), Some(PathBuf::from("/etc")));
        assert_eq!(resolve_dir(base, &dir("~"), home), Some(PathBuf::from("/home/me")));
        assert_eq!(resolve_dir(base, &dir("~/code"), home), Some(PathBuf::from("/home/me/code")));
        assert_eq!(resolve_dir(base, &CdTarget::Home, home), Some(PathBuf::from("/home/me")));
        assert_eq!(resolve_dir(base, &CdTarget::Home, None), None);
    }

    #[cfg(unix)]
    #[test]
    fn parent_of_root_stays_at_root() {
        let target = CdTarget::Dir("../../..".into());
        assert_eq!(resolve_dir(Path::new("/a"), &target, None), Some(PathBuf::from("/")));
    }
}
