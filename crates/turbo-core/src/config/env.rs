//! Environment snapshot: process variables first, `~/.env` entries as fallback

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Name of the dotenv file read from the user's home directory
pub const DOTENV_FILE: &str = ".env";

/// Read-only view of the variables the CLI cares about
///
/// Built once at startup. Lookups never touch the live process environment
/// afterwards, and nothing is ever written back to it.
#[derive(Debug, Clone, Default)]
pub struct Env {
    process: HashMap<String, String>,
    dotenv: HashMap<String, String>,
}

impl Env {
    /// Snapshot the process environment and the dotenv file in `home`, if any
    pub fn capture(home: &Path) -> Self {
        let dotenv_path = home.join(DOTENV_FILE);
        let dotenv = match dotenvy::from_path_iter(&dotenv_path) {
            Ok(iter) => {
                tracing::debug!(path = %dotenv_path.display(), "loaded dotenv file");
                collect_pairs(iter)
            }
            Err(_) => HashMap::new(),
        };

        Self {
            process: std::env::vars().collect(),
            dotenv,
        }
    }

    /// Build from explicit pairs (no dotenv layer)
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            process: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            dotenv: HashMap::new(),
        }
    }

    /// Layer dotenv content under the existing values
    pub fn with_dotenv(mut self, content: &str) -> Self {
        self.dotenv = collect_pairs(dotenvy::from_read_iter(content.as_bytes()));
        self
    }

    /// Look up a variable; empty values count as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.process
            .get(key)
            .or_else(|| self.dotenv.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Keep the well-formed entries; a bad line is logged and skipped
fn collect_pairs<R: Read>(iter: dotenvy::Iter<R>) -> HashMap<String, String> {
    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed dotenv line");
            None
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_value_wins_over_dotenv() {
        let env = Env::from_pairs([("CLI_HOME", ".from-process")]).with_dotenv("CLI_HOME=.from-file");
        assert_eq!(env.get("CLI_HOME"), Some(".from-process"));
    }

    #[test]
    fn test_dotenv_used_as_fallback() {
        let env = Env::from_pairs(Vec::<(String, String)>::new())
            .with_dotenv("# comment\n\nexport CLI_HOME=\".quoted\"\nLOG_LEVEL='verbose'\n");
        assert_eq!(env.get("CLI_HOME"), Some(".quoted"));
        assert_eq!(env.get("LOG_LEVEL"), Some("verbose"));
    }

    #[test]
    fn test_dotenv_inline_comment_and_escapes() {
        let env = Env::from_pairs(Vec::<(String, String)>::new())
            .with_dotenv("CLI_HOME=.x # note\nGREETING=\"a\\nb\"\n");
        assert_eq!(env.get("CLI_HOME"), Some(".x"));
        assert_eq!(env.get("GREETING"), Some("a\nb"));
    }

    #[test]
    fn test_empty_value_is_unset() {
        let env = Env::from_pairs([("CLI_TARGET_PATH", "")]);
        assert_eq!(env.get("CLI_TARGET_PATH"), None);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let env = Env::from_pairs(Vec::<(String, String)>::new()).with_dotenv("GOOD=1\nNOEQUALS\n");
        assert_eq!(env.get("GOOD"), Some("1"));
        assert_eq!(env.get("NOEQUALS"), None);
    }

    #[test]
    fn test_capture_reads_dotenv_from_home() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(DOTENV_FILE), "TURBO_DOTENV_ONLY_KEY=yes\n").unwrap();

        let env = Env::capture(home.path());
        assert_eq!(env.get("TURBO_DOTENV_ONLY_KEY"), Some("yes"));
    }
}
