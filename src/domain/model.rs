use serde::{Deserialize, Serialize};

/// A scoring group as declared in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub points: u64,
    /// Direct prerequisites, in declaration order.
    pub dependencies: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, points: u64) -> Self {
        Self {
            name: name.into(),
            points,
            dependencies: Vec::new(),
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    /// 1-based position in descriptor order.
    pub position: usize,
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub groups: Vec<Group>,
    pub tests: Vec<Test>,
}

/// One `[points, pattern]` entry of the CMS score parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreParameter(pub u64, pub String);

impl ScoreParameter {
    pub fn points(&self) -> u64 {
        self.0
    }

    pub fn pattern(&self) -> &str {
        &self.1
    }
}
