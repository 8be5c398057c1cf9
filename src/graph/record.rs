use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[serde(alias = "branch", alias = "local")]
    LocalBranch,
    #[serde(alias = "remote")]
    RemoteBranch,
    Tag,
}

impl RefKind {
    pub fn is_branch(self) -> bool {
        matches!(self, Self::LocalBranch | Self::RemoteBranch)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LocalBranch => "branch",
            Self::RemoteBranch => "remote",
            Self::Tag => "tag",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    pub name: String,
    pub kind: RefKind,
    /// Set on the ref the repository currently has checked out.
    #[serde(default, alias = "isHead", alias = "current")]
    pub is_head: bool,
}

impl CommitRef {
    pub fn new(name: impl Into<String>, kind: RefKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_head: false,
        }
    }

    pub fn head(mut self) -> Self {
        self.is_head = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// One commit as delivered by the history source. Never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    /// First entry is the primary parent.
    #[serde(default, alias = "parentHashes", alias = "parent_hashes")]
    pub parents: Vec<String>,
    #[serde(default)]
    pub refs: Vec<CommitRef>,
    #[serde(default)]
    pub author: Author,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, alias = "message")]
    pub subject: String,
}

impl CommitRecord {
    pub fn new(hash: impl Into<String>, parents: &[&str]) -> Self {
        Self {
            hash: hash.into(),
            parents: parents.iter().map(|parent| (*parent).to_owned()).collect(),
            refs: Vec::new(),
            author: Author::default(),
            timestamp: 0,
            subject: String::new(),
        }
    }

    pub fn with_ref(mut self, commit_ref: CommitRef) -> Self {
        self.refs.push(commit_ref);
        self
    }

    pub fn with_author(mut self, name: &str, email: &str) -> Self {
        self.author = Author {
            name: name.to_owned(),
            email: email.to_owned(),
        };
        self
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_head(&self) -> bool {
        self.refs.iter().any(|commit_ref| commit_ref.is_head)
    }
}
