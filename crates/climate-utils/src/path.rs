use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_tilde("runs/local"), PathBuf::from("runs/local"));
        assert_eq!(expand_tilde("/var/tmp/~x"), PathBuf::from("/var/tmp/~x"));
    }

    #[test]
    fn expands_home_prefix() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        assert_eq!(
            expand_tilde("~/.climate-impact/runs"),
            PathBuf::from(&home).join(".climate-impact/runs")
        );
        assert_eq!(expand_tilde("~"), PathBuf::from(home));
    }
}
