//! Agent bundle: a named set of instructions and the callables it may use.

use crate::types::callable::Callable;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub functions: Vec<Arc<dyn Callable>>,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: impl Callable + 'static) -> Self {
        self.functions.push(Arc::new(function));
        self
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .field("functions", &self.functions.len())
            .finish()
    }
}
