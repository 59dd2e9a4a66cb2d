use crate::{PatchError, Result, TokenId};
use nohash_hasher::IntMap;

/// Values that earlier patch instructions stored for later ones to use.
///
/// `2DAMEMORY` tokens hold text (row indices, labels, cell values) and `StrRef` tokens hold
/// talk table indices. One memory lives for exactly one install run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatcherMemory {
    /// `2DAMEMORY<n>` tokens.
    pub memory_2da: IntMap<TokenId, String>,
    /// `StrRef<n>` tokens.
    pub memory_str: IntMap<TokenId, u32>,
}

impl PatcherMemory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a `2DAMEMORY` token.
    pub fn get_2da(&self, token: TokenId) -> Result<&str> {
        self.memory_2da
            .get(&token)
            .map(String::as_str)
            .ok_or(PatchError::MissingToken2DA(token))
    }

    /// Look up a `StrRef` token.
    pub fn get_str(&self, token: TokenId) -> Result<u32> {
        self.memory_str
            .get(&token)
            .copied()
            .ok_or(PatchError::MissingTokenStr(token))
    }

    /// Store a `2DAMEMORY` token, overwriting any earlier value.
    pub fn set_2da(&mut self, token: TokenId, value: impl Into<String>) {
        self.memory_2da.insert(token, value.into());
    }

    /// Store a `StrRef` token, overwriting any earlier value.
    pub fn set_str(&mut self, token: TokenId, value: u32) {
        self.memory_str.insert(token, value);
    }
}

/// A text value that is either given directly or read from memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenUsage {
    /// A literal value.
    Constant(String),
    /// The value of a `2DAMEMORY` token.
    Memory2DA(TokenId),
    /// The value of a `StrRef` token.
    MemoryStr(TokenId),
}

impl TokenUsage {
    /// Resolve the value.
    pub fn value(&self, memory: &PatcherMemory) -> Result<String> {
        match self {
            TokenUsage::Constant(value) => Ok(value.clone()),
            TokenUsage::Memory2DA(token) => memory.get_2da(*token).map(str::to_string),
            TokenUsage::MemoryStr(token) => memory.get_str(*token).map(|n| n.to_string()),
        }
    }
}

impl From<&str> for TokenUsage {
    fn from(value: &str) -> Self {
        TokenUsage::Constant(value.to_string())
    }
}

impl From<i64> for TokenUsage {
    fn from(value: i64) -> Self {
        TokenUsage::Constant(value.to_string())
    }
}
