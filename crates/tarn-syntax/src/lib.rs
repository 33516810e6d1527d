//! Syntax tree data model for the Tarn frontend.
//!
//! The lexer and parser live outside this repository; what the resolution
//! engine consumes is the arena-of-nodes shape defined here, with stable
//! offsets and kind tags. [`SyntaxBuilder`] constructs trees programmatically
//! for tests and tooling.

mod arena;
mod builder;
mod node;

pub use arena::NodeArena;
pub use builder::SyntaxBuilder;
pub use node::{
    AccessorNode, AnonymousInitializerNode, AnonymousObjectNode, BlockNode, CallNode, ClassKind,
    ClassNode, ConstantValue, FunctionNode, JumpNode, LambdaNode, LiteralNode, LocalVariableNode,
    Modifiers, NameRefNode, Node, NodeData, NodeIndex, ParameterNode, PropertyNode, ReturnNode,
    SourceFileNode, SyntaxKind, TypeAliasNode, TypeArgSyntax, TypeParameterNode, TypeRefNode,
    TypeRefTarget, WhenNode,
};
