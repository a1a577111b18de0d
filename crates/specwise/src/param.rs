//! Formal parameters of expression trees.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// A formal parameter of a [`Lambda`](crate::Lambda).
///
/// Identity is the process-unique id, not the name: two parameters both
/// called `candidate` are different parameters, which is exactly why merged
/// expressions need their parameters unified before they can be evaluated.
#[derive(Debug, Clone)]
pub struct Param {
    id: u64,
    name: Arc<str>,
}

impl Param {
    /// Creates a fresh parameter.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Param {
            id: NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
