//! Declaration graph builder: syntax in, unresolved declarations out.
//!
//! Every declaration starts at `ResolvePhase::Unresolved`; bodies are built
//! eagerly in their raw shape (types and callees are filled in later by the
//! resolution engine). The builder also synthesizes the nodes the language
//! implies but the user did not write — default accessors, implicit
//! constructors — anchoring each to a fake source element so that no two
//! declaration nodes ever share a real one. Sharing a real element is a
//! builder bug and fails fast.

use crate::decls::{
    ClassDecl, ClassDeclKind, DeclKind, Declaration, DeclarationCell, DeclarationOrigin,
    FunctionDecl, PropertyAccessor, PropertyDecl, TypeAliasDecl, TypeParamDecl, TypeRef, ValueParam,
};
use crate::exprs::{ExprId, ExprKind, Expression, JumpKind};
use crate::graph::{DeclId, DeclarationGraph, GraphFile};
use crate::modules::ModuleId;
use crate::symbols::{SymbolId, SymbolKind};
use rustc_hash::FxHashSet;
use std::sync::RwLock;
use tarn_common::{
    ClassId, FakeElementKind, Modality, Name, PackageFqName, SourceElement, Visibility,
};
use tarn_syntax::{AccessorNode, ClassKind, NodeArena, NodeData, NodeIndex, PropertyNode};
use tarn_types::{LookupTag, Nullability, Type, TypeProjection};
use tracing::debug;

const PLACEHOLDER_DECL: DeclId = DeclId(u32::MAX);

pub struct DeclarationGraphBuilder<'a> {
    graph: &'a DeclarationGraph,
    arena: &'a NodeArena,
    module: ModuleId,
    package: PackageFqName,
    used_decl_sources: FxHashSet<SourceElement>,
    used_expr_sources: FxHashSet<SourceElement>,
    loop_stack: Vec<(Option<Name>, ExprId)>,
}

impl<'a> DeclarationGraphBuilder<'a> {
    /// Build one file's declarations into the graph.
    pub fn build_file(
        graph: &'a DeclarationGraph,
        module: ModuleId,
        arena: &'a NodeArena,
        root: NodeIndex,
    ) -> GraphFile {
        let root_node = arena.get(root).expect("missing root node");
        let file_node = root_node
            .as_source_file()
            .expect("graph builder requires a source-file root")
            .clone();
        let mut builder = DeclarationGraphBuilder {
            graph,
            arena,
            module,
            package: file_node.package.clone(),
            used_decl_sources: FxHashSet::default(),
            used_expr_sources: FxHashSet::default(),
            loop_stack: Vec::new(),
        };
        let top_level: Vec<DeclId> = file_node
            .declarations
            .iter()
            .map(|&decl| builder.build_declaration(decl, None))
            .collect();
        debug!(file = arena.file.0, decls = top_level.len(), "built file");
        let graph_file = GraphFile {
            file: arena.file,
            module,
            package: file_node.package,
            top_level,
        };
        graph.add_file(graph_file.clone());
        graph_file
    }

    fn decl_source(&mut self, node: NodeIndex) -> SourceElement {
        let source = self.arena.source(node);
        assert!(
            self.used_decl_sources.insert(source.clone()),
            "two declarations share one real source element at {:?}",
            source.range()
        );
        source
    }

    fn expr_source(&mut self, node: NodeIndex) -> SourceElement {
        let source = self.arena.source(node);
        assert!(
            self.used_expr_sources.insert(source.clone()),
            "two expressions share one real source element at {:?}",
            source.range()
        );
        source
    }

    fn build_declaration(
        &mut self,
        node: NodeIndex,
        containing: Option<(SymbolId, ClassId)>,
    ) -> DeclId {
        let data = self
            .arena
            .get(node)
            .expect("missing declaration node")
            .data
            .clone();
        match data {
            NodeData::Class(class) => self.build_class(node, &class, containing),
            NodeData::Function(function) => self.build_function(node, &function, containing, false),
            NodeData::Property(property) => self.build_property(node, &property, containing),
            NodeData::TypeAlias(alias) => self.build_type_alias(node, &alias, containing),
            NodeData::AnonymousInitializer(init) => {
                let source = self.decl_source(node);
                let body = self.build_expr_opt(init.body);
                let symbol = self.graph.symbols.alloc(SymbolKind::Function, PLACEHOLDER_DECL);
                self.commit(Declaration {
                    symbol,
                    name: Name::new("<init-block>"),
                    source,
                    origin: DeclarationOrigin::Source,
                    module: self.module,
                    file: self.arena.file,
                    containing_class: containing.map(|(symbol, _)| symbol),
                    visibility: Visibility::Private,
                    modality: Modality::Final,
                    is_expect: false,
                    is_actual: false,
                    suppressions: Vec::new(),
                    kind: DeclKind::AnonymousInitializer { body },
                    supertypes: Vec::new(),
                })
            }
            other => panic!("not a declaration node: {other:?}"),
        }
    }

    fn commit(&mut self, decl: Declaration) -> DeclId {
        let symbol = decl.symbol;
        let id = self.graph.add_cell(DeclarationCell::new(decl));
        self.graph.symbols.rebind(symbol, id);
        id
    }

    fn type_params(&mut self, nodes: &[NodeIndex]) -> Vec<TypeParamDecl> {
        nodes
            .iter()
            .map(|&node| {
                let param = self
                    .arena
                    .get(node)
                    .and_then(|n| n.as_type_parameter())
                    .expect("missing type parameter node")
                    .clone();
                let bounds = param
                    .bounds
                    .iter()
                    .map(|&bound| self.type_ref(bound))
                    .collect();
                TypeParamDecl {
                    id: self.graph.fresh_type_param_id(),
                    name: param.name,
                    bounds,
                }
            })
            .collect()
    }

    fn type_ref(&mut self, node: NodeIndex) -> TypeRef {
        let source = self.arena.source(node);
        TypeRef::from_syntax(source, node)
    }

    fn implicit_type_ref(&self, anchor: &SourceElement) -> TypeRef {
        TypeRef::from_syntax(
            anchor.fake_element(FakeElementKind::ImplicitTypeRef),
            NodeIndex::NONE,
        )
    }

    fn build_class(
        &mut self,
        node: NodeIndex,
        class: &tarn_syntax::ClassNode,
        containing: Option<(SymbolId, ClassId)>,
    ) -> DeclId {
        let source = self.decl_source(node);
        let symbol = self.graph.symbols.alloc(SymbolKind::Class, PLACEHOLDER_DECL);
        let class_id = match &containing {
            Some((_, owner)) => owner.nested(&class.name),
            None => ClassId::top_level(self.package.clone(), class.name.clone()),
        };
        self.graph.register_class_like(class_id.clone(), symbol);

        let type_params = self.type_params(&class.type_params);
        let supertype_refs = class
            .supertypes
            .iter()
            .map(|&supertype| self.type_ref(supertype))
            .collect();
        let mut members: Vec<DeclId> = class
            .members
            .iter()
            .map(|&member| self.build_declaration(member, Some((symbol, class_id.clone()))))
            .collect();

        if class.class_kind == ClassKind::Class {
            members.push(self.synthesize_implicit_constructor(
                &source,
                symbol,
                &class_id,
                &type_params,
            ));
        }

        let (default_modality, default_visibility) = match class.class_kind {
            ClassKind::Interface => (Modality::Abstract, Visibility::Public),
            _ => (Modality::Final, Visibility::Public),
        };
        self.commit(Declaration {
            symbol,
            name: class.name.clone(),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: containing.map(|(symbol, _)| symbol),
            visibility: class.modifiers.visibility.unwrap_or(default_visibility),
            modality: class.modifiers.modality.unwrap_or(default_modality),
            is_expect: class.modifiers.is_expect,
            is_actual: class.modifiers.is_actual,
            suppressions: class.modifiers.suppressions.clone(),
            kind: DeclKind::Class(ClassDecl {
                class_kind: match class.class_kind {
                    ClassKind::Class => ClassDeclKind::Class,
                    ClassKind::Interface => ClassDeclKind::Interface,
                    ClassKind::EnumClass => ClassDeclKind::EnumClass,
                    ClassKind::Object => ClassDeclKind::Object,
                },
                type_params,
                supertype_refs,
                members,
                is_anonymous: false,
            }),
            supertypes: Vec::new(),
        })
    }

    /// Classes without a written constructor still get one in the graph,
    /// anchored to a fake element over the class header.
    fn synthesize_implicit_constructor(
        &mut self,
        class_source: &SourceElement,
        class_symbol: SymbolId,
        class_id: &ClassId,
        type_params: &[TypeParamDecl],
    ) -> DeclId {
        let source = class_source.fake_element(FakeElementKind::ImplicitConstructor);
        let self_type = Type::class(
            LookupTag::new(class_id.clone()),
            type_params
                .iter()
                .map(|param| {
                    TypeProjection::invariant(Type::type_parameter(param.id, param.name.clone()))
                })
                .collect(),
            Nullability::NotNull,
        );
        let return_type = TypeRef::resolved(
            class_source.fake_element(FakeElementKind::ClassSelfTypeRef),
            self_type,
        );
        let symbol = self.graph.symbols.alloc(SymbolKind::Function, PLACEHOLDER_DECL);
        self.commit(Declaration {
            symbol,
            name: Name::new("<init>"),
            source,
            origin: DeclarationOrigin::Synthetic,
            module: self.module,
            file: self.arena.file,
            containing_class: Some(class_symbol),
            visibility: Visibility::Public,
            modality: Modality::Final,
            is_expect: false,
            is_actual: false,
            suppressions: Vec::new(),
            kind: DeclKind::Function(FunctionDecl {
                type_params: Vec::new(),
                params: Vec::new(),
                return_type,
                body: None,
                is_inline: false,
                is_anonymous: false,
            }),
            supertypes: Vec::new(),
        })
    }

    fn value_param(&mut self, node: NodeIndex) -> ValueParam {
        let param = self
            .arena
            .get(node)
            .and_then(|n| n.as_parameter())
            .expect("missing parameter node")
            .clone();
        let source = self.arena.source(node);
        let type_ref = if param.type_ref.is_some() {
            self.type_ref(param.type_ref)
        } else {
            self.implicit_type_ref(&source)
        };
        ValueParam {
            name: param.name,
            source,
            type_ref,
            is_vararg: param.is_vararg,
            is_noinline: param.is_noinline,
        }
    }

    fn build_function(
        &mut self,
        node: NodeIndex,
        function: &tarn_syntax::FunctionNode,
        containing: Option<(SymbolId, ClassId)>,
        is_anonymous: bool,
    ) -> DeclId {
        let source = self.decl_source(node);
        let type_params = self.type_params(&function.type_params);
        let params = function
            .params
            .iter()
            .map(|&param| self.value_param(param))
            .collect();
        let return_type = if function.return_type.is_some() {
            self.type_ref(function.return_type)
        } else {
            self.implicit_type_ref(&source)
        };
        let body = self.build_expr_opt(function.body);
        let symbol = self.graph.symbols.alloc(SymbolKind::Function, PLACEHOLDER_DECL);
        if containing.is_none() && !is_anonymous {
            self.graph.register_top_level_callable(
                self.package.clone(),
                function.name.clone(),
                symbol,
            );
        }
        self.commit(Declaration {
            symbol,
            name: function.name.clone(),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: containing.map(|(symbol, _)| symbol),
            visibility: function.modifiers.visibility.unwrap_or(Visibility::Public),
            modality: function.modifiers.modality.unwrap_or(Modality::Final),
            is_expect: function.modifiers.is_expect,
            is_actual: function.modifiers.is_actual,
            suppressions: function.modifiers.suppressions.clone(),
            kind: DeclKind::Function(FunctionDecl {
                type_params,
                params,
                return_type,
                body,
                is_inline: function.modifiers.is_inline,
                is_anonymous,
            }),
            supertypes: Vec::new(),
        })
    }

    fn build_property(
        &mut self,
        node: NodeIndex,
        property: &PropertyNode,
        containing: Option<(SymbolId, ClassId)>,
    ) -> DeclId {
        let source = self.decl_source(node);
        let type_params = self.type_params(&property.type_params);
        let receiver = property
            .receiver_type
            .is_some()
            .then(|| self.type_ref(property.receiver_type));
        let type_ref = if property.type_ref.is_some() {
            self.type_ref(property.type_ref)
        } else {
            self.implicit_type_ref(&source)
        };
        let initializer = self.build_expr_opt(property.initializer);
        let delegate = self.build_expr_opt(property.delegate);
        let has_delegate = delegate.is_some();
        let property_visibility = property.modifiers.visibility.unwrap_or(Visibility::Public);

        let getter = self.build_accessor(property, true, &source, has_delegate, property_visibility);
        let setter = if property.is_var || property.setter.is_some() {
            // A written setter on a val still becomes a graph node; the
            // checker reports it.
            self.build_accessor(property, false, &source, has_delegate, property_visibility)
        } else {
            None
        };

        let symbol = self.graph.symbols.alloc(SymbolKind::Property, PLACEHOLDER_DECL);
        if containing.is_none() {
            self.graph.register_top_level_callable(
                self.package.clone(),
                property.name.clone(),
                symbol,
            );
        }
        self.commit(Declaration {
            symbol,
            name: property.name.clone(),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: containing.map(|(symbol, _)| symbol),
            visibility: property_visibility,
            modality: property.modifiers.modality.unwrap_or(Modality::Final),
            is_expect: property.modifiers.is_expect,
            is_actual: property.modifiers.is_actual,
            suppressions: property.modifiers.suppressions.clone(),
            kind: DeclKind::Property(PropertyDecl {
                is_var: property.is_var,
                receiver,
                type_params,
                type_ref,
                initializer,
                delegate,
                getter,
                setter,
            }),
            supertypes: Vec::new(),
        })
    }

    /// Build a written accessor, or synthesize the default one. Synthesized
    /// accessors are anchored to the property's element under
    /// `DefaultAccessor` (or `DelegatedPropertyAccessor` when forwarding to
    /// a delegate).
    fn build_accessor(
        &mut self,
        property: &PropertyNode,
        getter: bool,
        property_source: &SourceElement,
        has_delegate: bool,
        property_visibility: Visibility,
    ) -> Option<PropertyAccessor> {
        let accessor_node = if getter { property.getter } else { property.setter };
        if accessor_node.is_some() {
            let accessor: AccessorNode = self
                .arena
                .get(accessor_node)
                .and_then(|n| n.as_accessor())
                .expect("missing accessor node")
                .clone();
            let source = self.decl_source(accessor_node);
            let param = accessor
                .param
                .is_some()
                .then(|| self.value_param(accessor.param));
            let return_type = if accessor.return_type.is_some() {
                self.type_ref(accessor.return_type)
            } else {
                self.implicit_type_ref(&source)
            };
            let body = self.build_expr_opt(accessor.body);
            return Some(PropertyAccessor {
                is_getter: accessor.is_getter,
                source,
                explicit_visibility: accessor.visibility,
                visibility: RwLock::new(accessor.visibility.unwrap_or(property_visibility)),
                param,
                return_type,
                body,
            });
        }

        let fake_kind = if has_delegate {
            FakeElementKind::DelegatedPropertyAccessor
        } else {
            FakeElementKind::DefaultAccessor
        };
        let source = property_source.fake_element(fake_kind);
        let param = (!getter).then(|| ValueParam {
            name: Name::new("value"),
            source: source.clone(),
            type_ref: self.implicit_type_ref(&source),
            is_vararg: false,
            is_noinline: false,
        });
        Some(PropertyAccessor {
            is_getter: getter,
            source: source.clone(),
            explicit_visibility: None,
            visibility: RwLock::new(property_visibility),
            param,
            return_type: self.implicit_type_ref(&source),
            body: None,
        })
    }

    fn build_type_alias(
        &mut self,
        node: NodeIndex,
        alias: &tarn_syntax::TypeAliasNode,
        containing: Option<(SymbolId, ClassId)>,
    ) -> DeclId {
        let source = self.decl_source(node);
        let symbol = self.graph.symbols.alloc(SymbolKind::TypeAlias, PLACEHOLDER_DECL);
        let alias_id = match &containing {
            Some((_, owner)) => owner.nested(&alias.name),
            None => ClassId::top_level(self.package.clone(), alias.name.clone()),
        };
        self.graph.register_class_like(alias_id, symbol);
        let type_params = self.type_params(&alias.type_params);
        let expanded_ref = self.type_ref(alias.expanded);
        self.commit(Declaration {
            symbol,
            name: alias.name.clone(),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: containing.map(|(symbol, _)| symbol),
            visibility: alias.modifiers.visibility.unwrap_or(Visibility::Public),
            modality: Modality::Final,
            is_expect: alias.modifiers.is_expect,
            is_actual: alias.modifiers.is_actual,
            suppressions: alias.modifiers.suppressions.clone(),
            kind: DeclKind::TypeAlias(TypeAliasDecl {
                type_params,
                expanded_ref,
            }),
            supertypes: Vec::new(),
        })
    }

    fn build_expr_opt(&mut self, node: NodeIndex) -> Option<ExprId> {
        node.is_some().then(|| self.build_expr(node))
    }

    fn build_expr(&mut self, node: NodeIndex) -> ExprId {
        let data = self.arena.get(node).expect("missing expression node").data.clone();
        let source = self.expr_source(node);
        match data {
            NodeData::Block(block) => {
                let statements = block
                    .statements
                    .iter()
                    .map(|&statement| self.build_expr(statement))
                    .collect();
                self.add_expr(ExprKind::Block { statements }, source)
            }
            NodeData::Call(call) => {
                let receiver = call.receiver.is_some().then(|| self.build_expr(call.receiver));
                let args = call.args.iter().map(|&arg| self.build_expr(arg)).collect();
                self.add_expr(
                    ExprKind::Call {
                        callee_name: call.callee,
                        receiver,
                        args,
                        is_safe: call.is_safe,
                    },
                    source,
                )
            }
            NodeData::Lambda(lambda) => {
                let function = self.build_lambda_function(node, &lambda);
                self.add_expr(ExprKind::Lambda { function }, source)
            }
            NodeData::AnonymousObject(object) => {
                let class = self.build_anonymous_object(node, &object);
                self.add_expr(ExprKind::AnonymousObject { class }, source)
            }
            NodeData::LocalVariable(variable) => {
                let initializer = self.build_expr_opt(variable.initializer);
                self.add_expr(
                    ExprKind::LocalVariable {
                        name: variable.name,
                        type_node: variable.type_ref,
                        initializer,
                    },
                    source,
                )
            }
            NodeData::When(when) => {
                let branches = when
                    .branches
                    .iter()
                    .map(|&branch| self.build_expr(branch))
                    .collect();
                self.add_expr(ExprKind::When { branches }, source)
            }
            NodeData::Loop(loop_node) => {
                // Reserve the loop's slot first so jumps inside the body can
                // target it, then commit the finished loop over it.
                let id = self.add_expr(
                    ExprKind::Loop {
                        label: loop_node.label.clone(),
                        body: ExprId(u32::MAX),
                    },
                    source.clone(),
                );
                self.loop_stack.push((loop_node.label.clone(), id));
                let body = self.build_expr(loop_node.body);
                self.loop_stack.pop();
                self.graph.replace_expr(
                    id,
                    Expression::new(
                        ExprKind::Loop {
                            label: loop_node.label,
                            body,
                        },
                        source,
                    ),
                );
                id
            }
            NodeData::Jump(jump) => {
                let kind = match self.arena.get(node).expect("jump node").kind {
                    tarn_syntax::SyntaxKind::BreakExpr => JumpKind::Break,
                    _ => JumpKind::Continue,
                };
                let target = self.resolve_jump_target(jump.label.as_ref());
                self.add_expr(ExprKind::Jump { kind, target }, source)
            }
            NodeData::NameRef(name_ref) => {
                self.add_expr(ExprKind::NameRef { name: name_ref.name }, source)
            }
            NodeData::Literal(literal) => {
                self.add_expr(ExprKind::Literal { value: literal.value }, source)
            }
            NodeData::Return(ret) => {
                let value = self.build_expr_opt(ret.value);
                self.add_expr(ExprKind::Return { value }, source)
            }
            other => panic!("not an expression node: {other:?}"),
        }
    }

    fn add_expr(&mut self, kind: ExprKind, source: SourceElement) -> ExprId {
        self.graph.add_expr(Expression::new(kind, source))
    }

    /// Lexical jump-target resolution: a labeled jump targets the matching
    /// enclosing loop; an unlabeled one targets the nearest. The target is
    /// unique per jump by construction.
    fn resolve_jump_target(&self, label: Option<&Name>) -> Option<ExprId> {
        match label {
            Some(label) => self
                .loop_stack
                .iter()
                .rev()
                .find(|(loop_label, _)| loop_label.as_ref() == Some(label))
                .map(|&(_, id)| id),
            None => self.loop_stack.last().map(|&(_, id)| id),
        }
    }

    fn build_lambda_function(
        &mut self,
        node: NodeIndex,
        lambda: &tarn_syntax::LambdaNode,
    ) -> DeclId {
        // Declarations and expressions anchor in separate namespaces, so the
        // anonymous function may share the lambda expression's real element.
        let source = self.decl_source(node);
        let return_type = self.implicit_type_ref(&source);
        let params = lambda
            .params
            .iter()
            .map(|&param| self.value_param(param))
            .collect();
        let body = self.build_expr_opt(lambda.body);
        let symbol = self.graph.symbols.alloc(SymbolKind::Function, PLACEHOLDER_DECL);
        self.commit(Declaration {
            symbol,
            name: Name::new("<anonymous>"),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: None,
            visibility: Visibility::Private,
            modality: Modality::Final,
            is_expect: false,
            is_actual: false,
            suppressions: Vec::new(),
            kind: DeclKind::Function(FunctionDecl {
                type_params: Vec::new(),
                params,
                return_type,
                body,
                is_inline: false,
                is_anonymous: true,
            }),
            supertypes: Vec::new(),
        })
    }

    fn build_anonymous_object(
        &mut self,
        node: NodeIndex,
        object: &tarn_syntax::AnonymousObjectNode,
    ) -> DeclId {
        let source = self.decl_source(node);
        let symbol = self.graph.symbols.alloc(SymbolKind::Class, PLACEHOLDER_DECL);
        // Anonymous classes have no denotable class id; members resolve
        // through the object's symbol. The placeholder id only namespaces
        // declarations nested inside, and carries the symbol number so two
        // objects never collide.
        let owner_id = ClassId::top_level(
            self.package.clone(),
            Name::new(&format!("<anonymous#{}>", symbol.0)),
        );
        let members = object
            .members
            .iter()
            .map(|&member| self.build_declaration(member, Some((symbol, owner_id.clone()))))
            .collect();
        self.commit(Declaration {
            symbol,
            name: Name::new("<anonymous>"),
            source,
            origin: DeclarationOrigin::Source,
            module: self.module,
            file: self.arena.file,
            containing_class: None,
            visibility: Visibility::Private,
            modality: Modality::Final,
            is_expect: false,
            is_actual: false,
            suppressions: Vec::new(),
            kind: DeclKind::Class(ClassDecl {
                class_kind: ClassDeclKind::Object,
                type_params: Vec::new(),
                supertype_refs: Vec::new(),
                members,
                is_anonymous: true,
            }),
            supertypes: Vec::new(),
        })
    }
}
