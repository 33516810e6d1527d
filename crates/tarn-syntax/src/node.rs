//! Syntax node kinds and their payloads.
//!
//! This is the *data model* of parsed syntax, not a parser: the real parser
//! is an external collaborator that fills a [`crate::NodeArena`] with these
//! nodes. Tests and tooling construct trees programmatically through
//! [`crate::SyntaxBuilder`].

use tarn_common::{ClassId, Modality, Name, PackageFqName, TextRange, Variance, Visibility};

/// Index of a node within its arena. `NONE` marks absent optional children.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(&self) -> bool {
        *self == NodeIndex::NONE
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ClassDecl,
    FunctionDecl,
    PropertyDecl,
    AccessorDecl,
    TypeAliasDecl,
    Parameter,
    TypeParameter,
    TypeRef,
    Block,
    Call,
    Lambda,
    AnonymousObject,
    AnonymousInitializer,
    LocalVariable,
    WhenExpr,
    Loop,
    BreakExpr,
    ContinueExpr,
    NameRef,
    Literal,
    ReturnExpr,
}

/// Modifier list attached to a declaration. Absent entries mean "use the
/// default for the declaration's position", which the graph builder fills in
/// during status resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Option<Visibility>,
    pub modality: Option<Modality>,
    pub is_expect: bool,
    pub is_actual: bool,
    pub is_inline: bool,
    pub is_data: bool,
    /// Diagnostic factory names silenced by a suppression annotation on
    /// this declaration.
    pub suppressions: Vec<String>,
}

impl Modifiers {
    pub fn suppress(mut self, factory_name: &str) -> Self {
        self.suppressions.push(factory_name.to_string());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = Some(modality);
        self
    }

    pub fn inline(mut self) -> Self {
        self.is_inline = true;
        self
    }

    pub fn expect(mut self) -> Self {
        self.is_expect = true;
        self
    }

    pub fn actual(mut self) -> Self {
        self.is_actual = true;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    Object,
}

/// How a written type names its target. Simple names are resolved against
/// type parameters in scope, then the file's package, then builtins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRefTarget {
    Simple(Name),
    Qualified(ClassId),
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArgSyntax {
    Star,
    Projection { variance: Variance, type_ref: NodeIndex },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstantValue {
    Int(i64),
    Boolean(bool),
    Text(String),
    Null,
    Unit,
}

#[derive(Clone, Debug)]
pub struct SourceFileNode {
    pub package: PackageFqName,
    pub declarations: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct ClassNode {
    pub name: Name,
    pub class_kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeIndex>,
    pub supertypes: Vec<NodeIndex>,
    pub members: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct FunctionNode {
    pub name: Name,
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeIndex>,
    pub params: Vec<NodeIndex>,
    pub return_type: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct PropertyNode {
    pub name: Name,
    pub is_var: bool,
    pub modifiers: Modifiers,
    /// Receiver type for extension properties, `NONE` otherwise.
    pub receiver_type: NodeIndex,
    pub type_params: Vec<NodeIndex>,
    pub type_ref: NodeIndex,
    pub initializer: NodeIndex,
    pub delegate: NodeIndex,
    pub getter: NodeIndex,
    pub setter: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AccessorNode {
    pub is_getter: bool,
    pub visibility: Option<Visibility>,
    /// Setter value parameter, `NONE` for getters.
    pub param: NodeIndex,
    pub return_type: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeAliasNode {
    pub name: Name,
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeIndex>,
    pub expanded: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ParameterNode {
    pub name: Name,
    pub type_ref: NodeIndex,
    pub is_vararg: bool,
    pub is_noinline: bool,
    pub default_value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeParameterNode {
    pub name: Name,
    pub variance: Variance,
    pub bounds: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct TypeRefNode {
    pub target: TypeRefTarget,
    pub args: Vec<TypeArgSyntax>,
    pub nullable: bool,
}

#[derive(Clone, Debug)]
pub struct BlockNode {
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct CallNode {
    pub callee: Name,
    pub receiver: NodeIndex,
    pub args: Vec<NodeIndex>,
    pub is_safe: bool,
}

#[derive(Clone, Debug)]
pub struct LambdaNode {
    pub params: Vec<NodeIndex>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AnonymousObjectNode {
    pub members: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct AnonymousInitializerNode {
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LocalVariableNode {
    pub name: Name,
    pub is_var: bool,
    pub type_ref: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct WhenNode {
    pub branches: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct LoopNode {
    pub label: Option<Name>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct JumpNode {
    pub label: Option<Name>,
}

#[derive(Clone, Debug)]
pub struct NameRefNode {
    pub name: Name,
}

#[derive(Clone, Debug)]
pub struct LiteralNode {
    pub value: ConstantValue,
}

#[derive(Clone, Debug)]
pub struct ReturnNode {
    pub value: NodeIndex,
}

#[derive(Clone, Debug)]
pub enum NodeData {
    SourceFile(SourceFileNode),
    Class(ClassNode),
    Function(FunctionNode),
    Property(PropertyNode),
    Accessor(AccessorNode),
    TypeAlias(TypeAliasNode),
    Parameter(ParameterNode),
    TypeParameter(TypeParameterNode),
    TypeRef(TypeRefNode),
    Block(BlockNode),
    Call(CallNode),
    Lambda(LambdaNode),
    AnonymousObject(AnonymousObjectNode),
    AnonymousInitializer(AnonymousInitializerNode),
    LocalVariable(LocalVariableNode),
    When(WhenNode),
    Loop(LoopNode),
    Jump(JumpNode),
    NameRef(NameRefNode),
    Literal(LiteralNode),
    Return(ReturnNode),
}

/// One syntax node: kind tag, source span, and the kind-specific payload.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub data: NodeData,
}

impl Node {
    pub fn as_source_file(&self) -> Option<&SourceFileNode> {
        match &self.data {
            NodeData::SourceFile(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassNode> {
        match &self.data {
            NodeData::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionNode> {
        match &self.data {
            NodeData::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyNode> {
        match &self.data {
            NodeData::Property(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_accessor(&self) -> Option<&AccessorNode> {
        match &self.data {
            NodeData::Accessor(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_type_alias(&self) -> Option<&TypeAliasNode> {
        match &self.data {
            NodeData::TypeAlias(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterNode> {
        match &self.data {
            NodeData::Parameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_type_parameter(&self) -> Option<&TypeParameterNode> {
        match &self.data {
            NodeData::TypeParameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_type_ref(&self) -> Option<&TypeRefNode> {
        match &self.data {
            NodeData::TypeRef(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockNode> {
        match &self.data {
            NodeData::Block(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match &self.data {
            NodeData::Call(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&LambdaNode> {
        match &self.data {
            NodeData::Lambda(data) => Some(data),
            _ => None,
        }
    }
}
