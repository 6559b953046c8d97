//! Built-in tools exposed over the Model Context Protocol
//!
//! Each tool pairs a typed input struct (which also yields its JSON schema)
//! with a stateless [`ToolHandler`](crate::registry::ToolHandler).

pub mod calculator;
pub mod clock;
pub mod prime;
pub mod utils;

use crate::registry::ToolRegistry;

use calculator::{AddTool, Arithmetic, DivideTool, MultiplyTool, Operation, SubtractTool};
use clock::{CurrentDatetime, DatetimeNowTool};
use prime::{IsPrime, IsPrimeTool};

/// Registry holding every built-in tool, in the order they are advertised by
/// `tools/list`.
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(AddTool::tool(), Arithmetic::new(Operation::Add));
    registry.register(SubtractTool::tool(), Arithmetic::new(Operation::Subtract));
    registry.register(MultiplyTool::tool(), Arithmetic::new(Operation::Multiply));
    registry.register(DivideTool::tool(), Arithmetic::new(Operation::Divide));
    registry.register(IsPrimeTool::tool(), IsPrime);
    registry.register(DatetimeNowTool::tool(), CurrentDatetime);
    registry
}

#[cfg(test)]
mod tests {
    use super::builtin_registry;

    #[test]
    fn builtin_registry_advertises_all_tools() {
        let names: Vec<String> = builtin_registry()
            .list()
            .into_iter()
            .map(|tool| tool.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "calculator/add",
                "calculator/subtract",
                "calculator/multiply",
                "calculator/divide",
                "prime/is_prime",
                "datetime/now",
            ]
        );
    }
}
