//! Repository model backing the scripted application.

/// Initial contents of the scripted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFixture {
    /// Commit subjects, newest first
    pub commits: Vec<String>,
    /// Local branch names; the first one is checked out
    pub branches: Vec<String>,
    /// Working tree entries as shown in the files panel
    pub files: Vec<String>,
    /// Stash entries
    pub stash: Vec<String>,
}

impl RepoFixture {
    /// Repository with `count` commits named `commit 01` (oldest) to
    /// `commit NN` (newest), listed newest first.
    #[must_use]
    pub fn with_commits(count: usize) -> Self {
        Self {
            commits: (1..=count).rev().map(|index| format!("commit {index:02}")).collect(),
            ..Self::default()
        }
    }

    /// Replace the branch list.
    #[must_use]
    pub fn branches<S: Into<String>>(mut self, branches: impl IntoIterator<Item = S>) -> Self {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the files list.
    #[must_use]
    pub fn files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for RepoFixture {
    fn default() -> Self {
        Self {
            commits: Vec::new(),
            branches: vec!["master".to_owned()],
            files: Vec::new(),
            stash: Vec::new(),
        }
    }
}

/// What happens to a commit when an interactive rebase continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    /// Keep the commit
    Pick,
    /// Fold into the previous commit, discarding the message
    Fixup,
    /// Fold into the previous commit, keeping the message
    Squash,
    /// Remove the commit
    Drop,
}

impl TodoAction {
    /// Label shown in the commits panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pick => "pick",
            Self::Fixup => "fixup",
            Self::Squash => "squash",
            Self::Drop => "drop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEntry {
    pub action: TodoAction,
    pub commit: String,
}

/// An interactive rebase stopped at an edited commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebase {
    /// Commits above the stop point, newest first
    pub todo: Vec<TodoEntry>,
    /// Commit the rebase stopped at
    pub edited: String,
    /// Commits below the stop point, newest first
    pub base: Vec<String>,
    /// Commit list before the rebase started
    pub original: Vec<String>,
}

impl Rebase {
    /// Stop at `commits[index]`.
    pub fn start(commits: &[String], index: usize) -> Option<Self> {
        let edited = commits.get(index)?.clone();
        Some(Self {
            todo: commits[..index]
                .iter()
                .map(|commit| TodoEntry {
                    action: TodoAction::Pick,
                    commit: commit.clone(),
                })
                .collect(),
            edited,
            base: commits[index + 1..].to_vec(),
            original: commits.to_vec(),
        })
    }

    /// Lines displayed in the commits panel while the rebase is in progress.
    pub fn lines(&self) -> Vec<String> {
        self.todo
            .iter()
            .map(|entry| format!("{} {}", entry.action.label(), entry.commit))
            .chain([format!("<-- YOU ARE HERE --- {}", self.edited)])
            .chain(self.base.iter().cloned())
            .collect()
    }

    /// Apply the todo list, oldest entry first, and return the resulting
    /// commits newest first.
    pub fn finish(self) -> Vec<String> {
        let mut oldest_first = self.base.into_iter().rev().collect::<Vec<_>>();
        oldest_first.push(self.edited);
        for entry in self.todo.into_iter().rev() {
            match entry.action {
                TodoAction::Pick => oldest_first.push(entry.commit),
                TodoAction::Fixup | TodoAction::Squash | TodoAction::Drop => {}
            }
        }
        oldest_first.reverse();
        oldest_first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebase_at_commit_02() -> Rebase {
        let fixture = RepoFixture::with_commits(5);
        Rebase::start(&fixture.commits, 3).unwrap()
    }

    #[test]
    fn test_with_commits_is_newest_first() {
        let fixture = RepoFixture::with_commits(3);
        assert_eq!(fixture.commits, vec!["commit 03", "commit 02", "commit 01"]);
    }

    #[test]
    fn test_rebase_lines() {
        let rebase = rebase_at_commit_02();
        assert_eq!(
            rebase.lines(),
            vec![
                "pick commit 05",
                "pick commit 04",
                "pick commit 03",
                "<-- YOU ARE HERE --- commit 02",
                "commit 01",
            ]
        );
    }

    #[test]
    fn test_finish_folds_and_drops() {
        let mut rebase = rebase_at_commit_02();
        rebase.todo[0].action = TodoAction::Squash;
        rebase.todo[1].action = TodoAction::Drop;
        rebase.todo[2].action = TodoAction::Fixup;
        assert_eq!(rebase.finish(), vec!["commit 02", "commit 01"]);
    }

    #[test]
    fn test_finish_all_picks_keeps_history() {
        let rebase = rebase_at_commit_02();
        assert_eq!(rebase.finish(), RepoFixture::with_commits(5).commits);
    }
}
