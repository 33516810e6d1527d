//! Programmatic syntax construction.
//!
//! The production parser fills arenas from text; tests and tooling use this
//! builder instead. Every node gets a fresh, non-overlapping span so that
//! positions behave like parsed ones (distinct nodes never share a real
//! source range).

use crate::arena::NodeArena;
use crate::node::*;
use tarn_common::{ClassId, FileId, Name, PackageFqName, TextRange, Variance, Visibility};

pub struct SyntaxBuilder {
    arena: NodeArena,
    cursor: u32,
}

impl SyntaxBuilder {
    pub fn new(file: FileId) -> Self {
        SyntaxBuilder {
            arena: NodeArena::new(file),
            cursor: 0,
        }
    }

    pub fn finish(self) -> NodeArena {
        self.arena
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn next_range(&mut self) -> TextRange {
        let start = self.cursor;
        self.cursor += 8;
        TextRange::new(start, start + 8)
    }

    fn add(&mut self, kind: SyntaxKind, data: NodeData) -> NodeIndex {
        let range = self.next_range();
        self.arena.add(Node { kind, range, data })
    }

    pub fn source_file(&mut self, package: PackageFqName, declarations: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            SyntaxKind::SourceFile,
            NodeData::SourceFile(SourceFileNode {
                package,
                declarations,
            }),
        )
    }

    pub fn class(
        &mut self,
        name: &str,
        class_kind: ClassKind,
        modifiers: Modifiers,
        type_params: Vec<NodeIndex>,
        supertypes: Vec<NodeIndex>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::ClassDecl,
            NodeData::Class(ClassNode {
                name: Name::new(name),
                class_kind,
                modifiers,
                type_params,
                supertypes,
                members,
            }),
        )
    }

    pub fn function(
        &mut self,
        name: &str,
        modifiers: Modifiers,
        type_params: Vec<NodeIndex>,
        params: Vec<NodeIndex>,
        return_type: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::FunctionDecl,
            NodeData::Function(FunctionNode {
                name: Name::new(name),
                modifiers,
                type_params,
                params,
                return_type,
                body,
            }),
        )
    }

    pub fn property(
        &mut self,
        name: &str,
        is_var: bool,
        modifiers: Modifiers,
        type_ref: NodeIndex,
        initializer: NodeIndex,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::PropertyDecl,
            NodeData::Property(PropertyNode {
                name: Name::new(name),
                is_var,
                modifiers,
                receiver_type: NodeIndex::NONE,
                type_params: Vec::new(),
                type_ref,
                initializer,
                delegate: NodeIndex::NONE,
                getter: NodeIndex::NONE,
                setter: NodeIndex::NONE,
            }),
        )
    }

    /// Property with the full set of optional pieces (accessors, delegate,
    /// extension receiver, type parameters).
    pub fn property_full(&mut self, property: PropertyNode) -> NodeIndex {
        self.add(SyntaxKind::PropertyDecl, NodeData::Property(property))
    }

    pub fn getter(
        &mut self,
        visibility: Option<Visibility>,
        return_type: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::AccessorDecl,
            NodeData::Accessor(AccessorNode {
                is_getter: true,
                visibility,
                param: NodeIndex::NONE,
                return_type,
                body,
            }),
        )
    }

    pub fn setter(
        &mut self,
        visibility: Option<Visibility>,
        param: NodeIndex,
        return_type: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::AccessorDecl,
            NodeData::Accessor(AccessorNode {
                is_getter: false,
                visibility,
                param,
                return_type,
                body,
            }),
        )
    }

    pub fn type_alias(
        &mut self,
        name: &str,
        modifiers: Modifiers,
        type_params: Vec<NodeIndex>,
        expanded: NodeIndex,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::TypeAliasDecl,
            NodeData::TypeAlias(TypeAliasNode {
                name: Name::new(name),
                modifiers,
                type_params,
                expanded,
            }),
        )
    }

    pub fn param(&mut self, name: &str, type_ref: NodeIndex) -> NodeIndex {
        self.add(
            SyntaxKind::Parameter,
            NodeData::Parameter(ParameterNode {
                name: Name::new(name),
                type_ref,
                is_vararg: false,
                is_noinline: false,
                default_value: NodeIndex::NONE,
            }),
        )
    }

    pub fn param_full(&mut self, parameter: ParameterNode) -> NodeIndex {
        self.add(SyntaxKind::Parameter, NodeData::Parameter(parameter))
    }

    pub fn type_param(&mut self, name: &str, bounds: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            SyntaxKind::TypeParameter,
            NodeData::TypeParameter(TypeParameterNode {
                name: Name::new(name),
                variance: Variance::Invariant,
                bounds,
            }),
        )
    }

    pub fn simple_type(&mut self, name: &str) -> NodeIndex {
        self.type_ref(TypeRefTarget::Simple(Name::new(name)), Vec::new(), false)
    }

    pub fn nullable_type(&mut self, name: &str) -> NodeIndex {
        self.type_ref(TypeRefTarget::Simple(Name::new(name)), Vec::new(), true)
    }

    pub fn class_type(&mut self, id: ClassId, args: Vec<TypeArgSyntax>) -> NodeIndex {
        self.type_ref(TypeRefTarget::Qualified(id), args, false)
    }

    pub fn generic_type(&mut self, name: &str, args: Vec<NodeIndex>) -> NodeIndex {
        let args = args
            .into_iter()
            .map(|type_ref| TypeArgSyntax::Projection {
                variance: Variance::Invariant,
                type_ref,
            })
            .collect();
        self.type_ref(TypeRefTarget::Simple(Name::new(name)), args, false)
    }

    pub fn type_ref(
        &mut self,
        target: TypeRefTarget,
        args: Vec<TypeArgSyntax>,
        nullable: bool,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::TypeRef,
            NodeData::TypeRef(TypeRefNode {
                target,
                args,
                nullable,
            }),
        )
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(SyntaxKind::Block, NodeData::Block(BlockNode { statements }))
    }

    pub fn call(&mut self, callee: &str, args: Vec<NodeIndex>) -> NodeIndex {
        self.call_on(NodeIndex::NONE, callee, args, false)
    }

    pub fn call_on(
        &mut self,
        receiver: NodeIndex,
        callee: &str,
        args: Vec<NodeIndex>,
        is_safe: bool,
    ) -> NodeIndex {
        self.add(
            SyntaxKind::Call,
            NodeData::Call(CallNode {
                callee: Name::new(callee),
                receiver,
                args,
                is_safe,
            }),
        )
    }

    pub fn lambda(&mut self, params: Vec<NodeIndex>, body: NodeIndex) -> NodeIndex {
        self.add(SyntaxKind::Lambda, NodeData::Lambda(LambdaNode { params, body }))
    }

    pub fn anonymous_object(&mut self, members: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            SyntaxKind::AnonymousObject,
            NodeData::AnonymousObject(AnonymousObjectNode { members }),
        )
    }

    pub fn init_block(&mut self, body: NodeIndex) -> NodeIndex {
        self.add(
            SyntaxKind::AnonymousInitializer,
            NodeData::AnonymousInitializer(AnonymousInitializerNode { body }),
        )
    }

    pub fn local_val(&mut self, name: &str, type_ref: NodeIndex, initializer: NodeIndex) -> NodeIndex {
        self.add(
            SyntaxKind::LocalVariable,
            NodeData::LocalVariable(LocalVariableNode {
                name: Name::new(name),
                is_var: false,
                type_ref,
                initializer,
            }),
        )
    }

    pub fn when_expr(&mut self, branches: Vec<NodeIndex>) -> NodeIndex {
        self.add(SyntaxKind::WhenExpr, NodeData::When(WhenNode { branches }))
    }

    pub fn loop_expr(&mut self, label: Option<&str>, body: NodeIndex) -> NodeIndex {
        self.add(
            SyntaxKind::Loop,
            NodeData::Loop(LoopNode {
                label: label.map(Name::new),
                body,
            }),
        )
    }

    pub fn break_expr(&mut self, label: Option<&str>) -> NodeIndex {
        self.add(
            SyntaxKind::BreakExpr,
            NodeData::Jump(JumpNode {
                label: label.map(Name::new),
            }),
        )
    }

    pub fn continue_expr(&mut self, label: Option<&str>) -> NodeIndex {
        self.add(
            SyntaxKind::ContinueExpr,
            NodeData::Jump(JumpNode {
                label: label.map(Name::new),
            }),
        )
    }

    pub fn name_ref(&mut self, name: &str) -> NodeIndex {
        self.add(
            SyntaxKind::NameRef,
            NodeData::NameRef(NameRefNode {
                name: Name::new(name),
            }),
        )
    }

    pub fn int_literal(&mut self, value: i64) -> NodeIndex {
        self.add(
            SyntaxKind::Literal,
            NodeData::Literal(LiteralNode {
                value: ConstantValue::Int(value),
            }),
        )
    }

    pub fn string_literal(&mut self, value: &str) -> NodeIndex {
        self.add(
            SyntaxKind::Literal,
            NodeData::Literal(LiteralNode {
                value: ConstantValue::Text(value.to_string()),
            }),
        )
    }

    pub fn null_literal(&mut self) -> NodeIndex {
        self.add(
            SyntaxKind::Literal,
            NodeData::Literal(LiteralNode {
                value: ConstantValue::Null,
            }),
        )
    }

    pub fn ret(&mut self, value: NodeIndex) -> NodeIndex {
        self.add(SyntaxKind::ReturnExpr, NodeData::Return(ReturnNode { value }))
    }
}
