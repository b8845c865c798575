//! Questions asked while resolving paths.
//!
//! Every question may be declined; callers treat a `None` or `false` as the
//! user backing out.

use anyhow::Result;
use std::path::{Path, PathBuf};

pub trait Prompter {
    /// Asks for the file whose commentary should be updated.
    fn target_path(&mut self) -> Result<Option<PathBuf>>;

    /// Asks for the companion document of `target`, offering `candidates`.
    fn companion_path(&mut self, target: &Path, candidates: &[PathBuf])
    -> Result<Option<PathBuf>>;

    /// Asks whether `relative` should be remembered inside `target`.
    fn confirm_save(&mut self, target: &Path, relative: &Path) -> Result<bool>;
}

/// Answers without asking: no paths, and a fixed answer about saving.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive {
    pub save_cache: bool,
}

impl Prompter for NonInteractive {
    fn target_path(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn companion_path(&mut self, _: &Path, _: &[PathBuf]) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn confirm_save(&mut self, _: &Path, _: &Path) -> Result<bool> {
        Ok(self.save_cache)
    }
}

#[cfg(feature = "prompt")]
pub use terminal::TerminalPrompter;

#[cfg(feature = "prompt")]
mod terminal {
    use super::Prompter;
    use crate::error::Error;
    use crate::utils::parent_dir;
    use anyhow::Result;
    use dialoguer::{Confirm, Input, Select};
    use std::path::{Path, PathBuf};

    /// Prompts on the terminal with `dialoguer`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TerminalPrompter {
        /// Save the cache without asking.
        pub assume_yes: bool,
    }

    impl TerminalPrompter {
        fn ask_path(&self, prompt: &str) -> Result<Option<PathBuf>> {
            let answer: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(Error::from)?;

            let answer = answer.trim();
            Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
        }
    }

    impl Prompter for TerminalPrompter {
        fn target_path(&mut self) -> Result<Option<PathBuf>> {
            self.ask_path("File to update")
        }

        fn companion_path(
            &mut self,
            target: &Path,
            candidates: &[PathBuf],
        ) -> Result<Option<PathBuf>> {
            let prompt = format!("Org document for {}", target.display());
            if candidates.is_empty() {
                return self.ask_path(&prompt);
            }

            let dir = parent_dir(target);
            let mut items: Vec<String> = candidates
                .iter()
                .map(|c| c.strip_prefix(&dir).unwrap_or(c).display().to_string())
                .collect();
            items.push("Other...".to_string());

            let choice = Select::new()
                .with_prompt(&prompt)
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(Error::from)?;

            match choice {
                Some(i) if i < candidates.len() => Ok(Some(candidates[i].clone())),
                Some(_) => self.ask_path(&prompt),
                None => Ok(None),
            }
        }

        fn confirm_save(&mut self, target: &Path, relative: &Path) -> Result<bool> {
            if self.assume_yes {
                return Ok(true);
            }

            let answer = Confirm::new()
                .with_prompt(format!(
                    "Remember {} as the Org document of {}?",
                    relative.display(),
                    target.display()
                ))
                .default(true)
                .interact_opt()
                .map_err(Error::from)?;

            Ok(answer.unwrap_or(false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_declines_paths() {
        let mut prompter = NonInteractive::default();
        assert_eq!(prompter.target_path().unwrap(), None);
        assert_eq!(
            prompter
                .companion_path(Path::new("a.el"), &[PathBuf::from("a.org")])
                .unwrap(),
            None
        );
        assert!(!prompter.confirm_save(Path::new("a.el"), Path::new("a.org")).unwrap());
    }

    #[test]
    fn test_non_interactive_save_answer() {
        let mut prompter = NonInteractive { save_cache: true };
        assert!(prompter.confirm_save(Path::new("a.el"), Path::new("a.org")).unwrap());
    }
}
