//! Phase-advancement engine.
//!
//! Each declaration advances `Unresolved -> SupertypesResolved ->
//! StatusResolved -> TypesResolved -> BodyResolved`, computing exactly the
//! information the next phase requires. Advancement is single-flight per
//! node: concurrent requesters of the same phase block on the node's resolve
//! lock, and whoever loses the race observes the committed result instead of
//! recomputing. Resolution is total — a declaration always reaches
//! `BodyResolved`, embedding error types where inference or lookup failed.
//!
//! Cancellation is observed at node boundaries only; within one node's
//! phase computation there are no cancellation points between the first
//! commit and the last, so a cancelled run never leaves a node partially
//! updated.

use crate::calls::{CallResolution, resolve_call};
use crate::diagnostics;
use crate::infer::InferenceContext;
use crate::subtype::SubtypeChecker;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tarn_binder::{
    DeclId, DeclKind, DeclarationCell, ExprKind, ResolvePhase, ResolvedCall, Session, SymbolId,
    SymbolKind, TypeRef,
};
use tarn_common::{
    Cancelled, CancellationToken, ClassId, DiagnosticSink, FileId, Name, PackageFqName,
};
use tarn_syntax::{ConstantValue, NodeArena, NodeIndex, TypeArgSyntax, TypeRefTarget};
use tarn_types::{
    ClassType, FlexibleType, LookupTag, Nullability, SimpleType, Type, TypeParameterId,
    TypeProjection, builtins, substitutor_for_arguments,
};
use tracing::{debug, trace};

pub struct ResolutionEngine {
    session: Arc<Session>,
    arenas: FxHashMap<FileId, Arc<NodeArena>>,
    sink: Arc<DiagnosticSink>,
}

/// Type parameters visible while resolving one declaration's type positions:
/// its own parameters plus those of every containing declaration.
#[derive(Clone, Default)]
struct TypeParamScope {
    by_name: FxHashMap<Name, TypeParameterId>,
}

impl ResolutionEngine {
    pub fn new(
        session: Arc<Session>,
        arenas: FxHashMap<FileId, Arc<NodeArena>>,
        sink: Arc<DiagnosticSink>,
    ) -> Self {
        ResolutionEngine {
            session,
            arenas,
            sink,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Advance the whole graph to `BodyResolved`, phase by phase. The global
    /// sweep guarantees that whenever a phase consults other declarations
    /// (scopes need supertype members' types), those declarations have
    /// already reached the phase being consulted.
    pub fn resolve_graph(&self, token: &CancellationToken) -> Result<(), Cancelled> {
        for phase in [
            ResolvePhase::SupertypesResolved,
            ResolvePhase::StatusResolved,
            ResolvePhase::TypesResolved,
        ] {
            for decl in self.session.graph.all_decl_ids() {
                self.advance_to(decl, phase, token)?;
            }
            if phase == ResolvePhase::SupertypesResolved {
                self.detect_supertype_cycles(token)?;
            }
        }
        for decl in self.session.graph.all_decl_ids() {
            self.advance_to(decl, ResolvePhase::BodyResolved, token)?;
        }
        debug!(decls = self.session.graph.decl_count(), "graph fully resolved");
        Ok(())
    }

    /// Advance one declaration to `target`. Safe to call concurrently for
    /// the same declaration: at most one thread computes each phase.
    pub fn advance_to(
        &self,
        decl: DeclId,
        target: ResolvePhase,
        token: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let cell = self.session.graph.cell(decl);
        while cell.phase() < target {
            token.check()?;
            let guard = cell.lock_for_resolve();
            if cell.phase() >= target {
                break;
            }
            let next = cell
                .phase()
                .next()
                .expect("phase below target implies a successor");
            self.compute_phase(&cell, next);
            cell.advance_phase(next);
            drop(guard);
        }
        Ok(())
    }

    fn compute_phase(&self, cell: &Arc<DeclarationCell>, phase: ResolvePhase) {
        trace!(symbol = cell.symbol().0, ?phase, "computing phase");
        match phase {
            ResolvePhase::Unresolved => unreachable!("nothing computes back to Unresolved"),
            ResolvePhase::SupertypesResolved => self.resolve_supertypes(cell),
            ResolvePhase::StatusResolved => self.resolve_status(cell),
            ResolvePhase::TypesResolved => self.resolve_types(cell),
            ResolvePhase::BodyResolved => self.resolve_body(cell),
        }
    }

    // ---------------------------------------------------------------------
    // Supertypes
    // ---------------------------------------------------------------------

    fn resolve_supertypes(&self, cell: &Arc<DeclarationCell>) {
        let refs: Vec<(tarn_common::SourceElement, NodeIndex)>;
        let file;
        {
            let decl = cell.read();
            let Some(class) = decl.as_class() else {
                return;
            };
            file = decl.file;
            refs = class
                .supertype_refs
                .iter()
                .map(|supertype| (supertype.source.clone(), supertype.node))
                .collect();
        }
        let scope = self.type_param_scope_of(cell);

        let mut resolved = Vec::with_capacity(refs.len());
        for (source, node) in refs {
            resolved.push(self.resolve_type_node(file, node, &source, &scope));
        }

        let mut decl = cell.write();
        if let DeclKind::Class(class) = &decl.kind {
            for (supertype_ref, ty) in class.supertype_refs.iter().zip(&resolved) {
                supertype_ref.resolve_to(ty.clone());
            }
        }
        decl.supertypes = resolved;
    }

    /// Post-sweep cycle pass: a class reachable from itself through
    /// supertype edges gets its supertype list replaced with an error type
    /// and a diagnostic, so scope construction cannot loop. Detection runs
    /// over the intact graph before any edge is broken, so every class on a
    /// cycle is reported, not just the first one visited.
    fn detect_supertype_cycles(&self, token: &CancellationToken) -> Result<(), Cancelled> {
        let graph = &self.session.graph;
        let mut cyclic: Vec<DeclId> = Vec::new();
        for decl_id in graph.all_decl_ids() {
            token.check()?;
            let cell = graph.cell(decl_id);
            let decl = cell.read();
            if decl.as_class().is_none() || decl.supertypes.is_empty() {
                continue;
            }
            let start = decl.symbol;
            drop(decl);
            if self.reaches_itself(start) {
                cyclic.push(decl_id);
            }
        }
        for decl_id in cyclic {
            let cell = graph.cell(decl_id);
            let (name, source) = {
                let decl = cell.read();
                (decl.name.clone(), decl.source.clone())
            };
            self.sink
                .report_on(&source, diagnostics::SUPERTYPE_CYCLE, &[name.as_str()]);
            cell.write().supertypes = vec![Type::error(format!(
                "cycle in the supertype hierarchy of {name}"
            ))];
        }
        Ok(())
    }

    fn reaches_itself(&self, start: SymbolId) -> bool {
        let graph = &self.session.graph;
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut work: Vec<SymbolId> = vec![start];
        while let Some(symbol) = work.pop() {
            let cell = graph.cell_of(symbol);
            let decl = cell.read();
            for supertype in &decl.supertypes {
                let Some(super_id) = supertype.class_id() else {
                    continue;
                };
                let Some(super_symbol) = self.session.provider.find_class(super_id) else {
                    continue;
                };
                if super_symbol == start {
                    return true;
                }
                if visited.insert(super_symbol) {
                    work.push(super_symbol);
                }
            }
        }
        false
    }

    // ---------------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------------

    fn resolve_status(&self, cell: &Arc<DeclarationCell>) {
        let decl = cell.read();
        if let DeclKind::Property(property) = &decl.kind {
            // Accessor visibility defaults to the property's; an explicit
            // accessor visibility stands on its own and is judged by the
            // accessor checkers.
            for accessor in [property.getter.as_ref(), property.setter.as_ref()]
                .into_iter()
                .flatten()
            {
                let effective = accessor.explicit_visibility.unwrap_or(decl.visibility);
                accessor.set_effective_visibility(effective);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    fn resolve_types(&self, cell: &Arc<DeclarationCell>) {
        let scope = self.type_param_scope_of(cell);
        let decl = cell.read();
        let file = decl.file;
        match &decl.kind {
            DeclKind::Class(class) => {
                for param in &class.type_params {
                    for bound in &param.bounds {
                        let ty = self.resolve_type_ref(file, bound, &scope);
                        bound.resolve_to(ty);
                    }
                }
            }
            DeclKind::TypeAlias(alias) => {
                for param in &alias.type_params {
                    for bound in &param.bounds {
                        let ty = self.resolve_type_ref(file, bound, &scope);
                        bound.resolve_to(ty);
                    }
                }
                let ty = self.resolve_type_ref(file, &alias.expanded_ref, &scope);
                alias.expanded_ref.resolve_to(ty);
            }
            DeclKind::Function(function) => {
                for param in &function.params {
                    let ty = if param.type_ref.is_implicit() {
                        // Lambda parameters without written types stay
                        // unknown until a future contextual-typing pass.
                        Type::error("parameter type cannot be inferred here")
                    } else {
                        self.resolve_type_ref(file, &param.type_ref, &scope)
                    };
                    param.type_ref.resolve_to(ty);
                }
                let return_type = if function.return_type.is_implicit() {
                    self.infer_function_return_type(function)
                } else {
                    self.resolve_type_ref(file, &function.return_type, &scope)
                };
                function.return_type.resolve_to(return_type);
            }
            DeclKind::Property(property) => {
                let property_type = if property.type_ref.is_implicit() {
                    match self.infer_initializer_type(property.initializer) {
                        Some(ty) => ty,
                        None => {
                            self.sink
                                .report_on(&decl.source, diagnostics::CANNOT_INFER_TYPE, &[]);
                            Type::error(format!("cannot infer a type for property {}", decl.name))
                        }
                    }
                } else {
                    self.resolve_type_ref(file, &property.type_ref, &scope)
                };
                property.type_ref.resolve_to(property_type.clone());

                if let Some(receiver) = &property.receiver {
                    let ty = self.resolve_type_ref(file, receiver, &scope);
                    receiver.resolve_to(ty);
                }
                if let Some(getter) = &property.getter {
                    let ty = if getter.return_type.is_implicit() {
                        property_type.clone()
                    } else {
                        self.resolve_type_ref(file, &getter.return_type, &scope)
                    };
                    getter.return_type.resolve_to(ty);
                }
                if let Some(setter) = &property.setter {
                    if let Some(param) = &setter.param {
                        let ty = if param.type_ref.is_implicit() {
                            property_type.clone()
                        } else {
                            self.resolve_type_ref(file, &param.type_ref, &scope)
                        };
                        param.type_ref.resolve_to(ty);
                    }
                    let ty = if setter.return_type.is_implicit() {
                        builtins::unit_type()
                    } else {
                        self.resolve_type_ref(file, &setter.return_type, &scope)
                    };
                    setter.return_type.resolve_to(ty);
                }
            }
            DeclKind::AnonymousInitializer { .. } => {}
        }
    }

    /// Return type of a function that declared none: the literal type of an
    /// expression body, `Unit` for block bodies.
    fn infer_function_return_type(&self, function: &tarn_binder::FunctionDecl) -> Type {
        match function.body {
            Some(body) => match &self.session.graph.expr(body).kind {
                ExprKind::Literal { value } => literal_type(value),
                _ => builtins::unit_type(),
            },
            None => builtins::unit_type(),
        }
    }

    fn infer_initializer_type(&self, initializer: Option<tarn_binder::ExprId>) -> Option<Type> {
        let initializer = initializer?;
        match &self.session.graph.expr(initializer).kind {
            ExprKind::Literal { value } => Some(literal_type(value)),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Type references
    // ---------------------------------------------------------------------

    fn type_param_scope_of(&self, cell: &Arc<DeclarationCell>) -> TypeParamScope {
        let mut scope = TypeParamScope::default();
        let mut chain: Vec<Arc<DeclarationCell>> = Vec::new();
        let mut current = Some(Arc::clone(cell));
        while let Some(cell) = current {
            let containing = cell.read().containing_class;
            chain.push(cell);
            current = containing.map(|symbol| self.session.graph.cell_of(symbol));
        }
        // Outermost first, so inner parameters shadow outer ones.
        for cell in chain.iter().rev() {
            let decl = cell.read();
            let params = match &decl.kind {
                DeclKind::Class(class) => &class.type_params,
                DeclKind::TypeAlias(alias) => &alias.type_params,
                DeclKind::Function(function) => &function.type_params,
                DeclKind::Property(property) => &property.type_params,
                DeclKind::AnonymousInitializer { .. } => continue,
            };
            for param in params {
                scope.by_name.insert(param.name.clone(), param.id);
            }
        }
        scope
    }

    fn resolve_type_ref(&self, file: FileId, type_ref: &TypeRef, scope: &TypeParamScope) -> Type {
        self.resolve_type_node(file, type_ref.node, &type_ref.source, scope)
    }

    fn resolve_type_node(
        &self,
        file: FileId,
        node: NodeIndex,
        source: &tarn_common::SourceElement,
        scope: &TypeParamScope,
    ) -> Type {
        if node.is_none() {
            return Type::error("implicit type was not inferred");
        }
        let arena = self
            .arenas
            .get(&file)
            .unwrap_or_else(|| panic!("no syntax arena registered for file {file:?}"));
        let type_node = arena
            .get(node)
            .and_then(|n| n.as_type_ref())
            .expect("type ref node points at a non-type node")
            .clone();

        let nullability = if type_node.nullable {
            Nullability::Nullable
        } else {
            Nullability::NotNull
        };

        match &type_node.target {
            TypeRefTarget::Dynamic => Type::Flexible(FlexibleType::dynamic()),
            TypeRefTarget::Simple(name) => {
                if let Some(&param_id) = scope.by_name.get(name) {
                    return Type::type_parameter(param_id, name.clone())
                        .with_nullability(nullability);
                }
                let package_id = ClassId::top_level(self.package_of_file(file), name.clone());
                if self.session.provider.find_class(&package_id).is_some()
                    || self.session.provider.find_type_alias(&package_id).is_some()
                {
                    return self.class_like_type(
                        package_id,
                        &type_node.args,
                        nullability,
                        file,
                        source,
                        scope,
                    );
                }
                if let Some(builtin_id) = builtins::by_short_name(name.as_str()) {
                    return self.class_like_type(
                        builtin_id,
                        &type_node.args,
                        nullability,
                        file,
                        source,
                        scope,
                    );
                }
                self.report_unresolved(source, name.as_str());
                Type::error(format!("unresolved reference: {name}"))
            }
            TypeRefTarget::Qualified(id) => {
                if self.session.provider.find_class(id).is_some()
                    || self.session.provider.find_type_alias(id).is_some()
                {
                    self.class_like_type(id.clone(), &type_node.args, nullability, file, source, scope)
                } else {
                    self.report_unresolved(source, &id.to_string());
                    Type::error(format!("unresolved reference: {id}"))
                }
            }
        }
    }

    fn class_like_type(
        &self,
        id: ClassId,
        args: &[TypeArgSyntax],
        nullability: Nullability,
        file: FileId,
        source: &tarn_common::SourceElement,
        scope: &TypeParamScope,
    ) -> Type {
        let arguments: Vec<TypeProjection> = args
            .iter()
            .map(|arg| match arg {
                TypeArgSyntax::Star => TypeProjection::Star,
                TypeArgSyntax::Projection { variance, type_ref } => TypeProjection::Argument {
                    variance: *variance,
                    ty: Box::new(self.resolve_type_node(file, *type_ref, source, scope)),
                },
            })
            .collect();
        Type::class(LookupTag::new(id), arguments, nullability)
    }

    fn report_unresolved(&self, source: &tarn_common::SourceElement, name: &str) {
        if source.kind().skip_error_type_reporting() {
            return;
        }
        self.sink
            .report_on(source, diagnostics::UNRESOLVED_REFERENCE, &[name]);
    }

    fn package_of_file(&self, file: FileId) -> PackageFqName {
        self.session
            .graph
            .files()
            .iter()
            .find(|graph_file| graph_file.file == file)
            .map(|graph_file| graph_file.package.clone())
            .unwrap_or_else(PackageFqName::root)
    }

    // ---------------------------------------------------------------------
    // Bodies
    // ---------------------------------------------------------------------

    fn resolve_body(&self, cell: &Arc<DeclarationCell>) {
        // Gather everything under the read guard, then drop it before
        // resolving: expression resolution may look the current declaration
        // up again (recursive calls), and nested reads of one cell's lock
        // from the same thread are off-limits.
        let file;
        let containing_class;
        let mut bodies: Vec<tarn_binder::ExprId> = Vec::new();
        let mut params: FxHashMap<Name, Type> = FxHashMap::default();
        {
            let decl = cell.read();
            file = decl.file;
            containing_class = decl.containing_class;
            match &decl.kind {
                DeclKind::Function(function) => {
                    // Anonymous functions resolve inline with their
                    // enclosing declaration's resolver, which has the
                    // captured scope; nothing to do through this cell.
                    if function.is_anonymous {
                        return;
                    }
                    bodies.extend(function.body);
                    params = function
                        .params
                        .iter()
                        .map(|param| (param.name.clone(), param.type_ref.resolved_type()))
                        .collect();
                }
                DeclKind::Property(property) => {
                    bodies.extend(property.initializer);
                    bodies.extend(property.delegate);
                    for accessor in [property.getter.as_ref(), property.setter.as_ref()]
                        .into_iter()
                        .flatten()
                    {
                        bodies.extend(accessor.body);
                    }
                }
                DeclKind::AnonymousInitializer { body } => bodies.extend(*body),
                DeclKind::Class(_) | DeclKind::TypeAlias(_) => {}
            }
        }
        if bodies.is_empty() {
            return;
        }
        let scope = self.type_param_scope_of(cell);
        let mut resolver = BodyResolver::new(self, file, containing_class, params, scope);
        for body in bodies {
            resolver.resolve_expr(body);
        }
    }
}

fn literal_type(value: &ConstantValue) -> Type {
    match value {
        ConstantValue::Int(_) => builtins::int_type(),
        ConstantValue::Boolean(_) => builtins::boolean_type(),
        ConstantValue::Text(_) => builtins::string_type(),
        ConstantValue::Null => builtins::nothing_type().with_nullability(Nullability::Nullable),
        ConstantValue::Unit => builtins::unit_type(),
    }
}

/// Declared supertypes of the class behind `class_type`, substituted at this
/// use site. A nullable use propagates its nullability onto the result.
pub fn supertypes_of_class_type(
    session: &Session,
    class_type: &ClassType,
    nullability: Nullability,
) -> Vec<Type> {
    let Some(symbol) = session.provider.find_class(class_type.tag.class_id()) else {
        return Vec::new();
    };
    let cell = session.graph.cell_of(symbol);
    let decl = cell.read();
    let Some(class) = decl.as_class() else {
        return Vec::new();
    };
    let params: Vec<TypeParameterId> = class.type_params.iter().map(|param| param.id).collect();
    let substitutor = substitutor_for_arguments(&params, &class_type.arguments);
    decl.supertypes
        .iter()
        .map(|supertype| {
            let substituted = substitutor.substitute(supertype);
            if nullability == Nullability::Nullable {
                substituted.with_nullability(Nullability::Nullable)
            } else {
                substituted
            }
        })
        .collect()
}

/// Resolves one declaration body's expressions: name references against
/// local/parameter/member scopes, calls via overload resolution, and types
/// bottom-up. Failure embeds an error type and reports; it never aborts.
struct BodyResolver<'a> {
    engine: &'a ResolutionEngine,
    file: FileId,
    containing_class: Option<SymbolId>,
    params: FxHashMap<Name, Type>,
    type_params: TypeParamScope,
    locals: Vec<FxHashMap<Name, Type>>,
    relation: SubtypeChecker,
}

impl<'a> BodyResolver<'a> {
    fn new(
        engine: &'a ResolutionEngine,
        file: FileId,
        containing_class: Option<SymbolId>,
        params: FxHashMap<Name, Type>,
        type_params: TypeParamScope,
    ) -> Self {
        BodyResolver {
            engine,
            file,
            containing_class,
            params,
            type_params,
            locals: vec![FxHashMap::default()],
            relation: SubtypeChecker::new(Arc::clone(&engine.session)),
        }
    }

    fn session(&self) -> &Session {
        &self.engine.session
    }

    fn resolve_expr(&mut self, id: tarn_binder::ExprId) -> Type {
        let expr = self.session().graph.expr(id);
        let ty = match &expr.kind {
            ExprKind::Literal { value } => literal_type(value),
            ExprKind::Block { statements } => {
                self.locals.push(FxHashMap::default());
                for &statement in statements {
                    self.resolve_expr(statement);
                }
                self.locals.pop();
                builtins::unit_type()
            }
            ExprKind::LocalVariable {
                name,
                type_node,
                initializer,
            } => {
                let initializer_type = initializer.map(|init| self.resolve_expr(init));
                let ty = if type_node.is_some() {
                    self.engine
                        .resolve_type_node(self.file, *type_node, &expr.source, &self.type_params)
                } else {
                    initializer_type
                        .unwrap_or_else(|| Type::error("local variable without initializer"))
                };
                self.locals
                    .last_mut()
                    .expect("locals stack never empty")
                    .insert(name.clone(), ty);
                builtins::unit_type()
            }
            ExprKind::NameRef { name } => self.resolve_name(name, &expr.source),
            ExprKind::Call {
                callee_name,
                receiver,
                args,
                is_safe,
            } => self.resolve_call_expr(id, callee_name, *receiver, args, *is_safe, &expr.source),
            ExprKind::Lambda { function } => {
                // The lambda body resolves here, in the enclosing scope, so
                // its references see the enclosing locals and parameters.
                let (lambda_params, lambda_body) = {
                    let cell = self.session().graph.cell(*function);
                    let decl = cell.read();
                    match &decl.kind {
                        DeclKind::Function(lambda) => (
                            lambda
                                .params
                                .iter()
                                .map(|param| (param.name.clone(), param.type_ref.resolved_type()))
                                .collect::<FxHashMap<_, _>>(),
                            lambda.body,
                        ),
                        _ => (FxHashMap::default(), None),
                    }
                };
                self.locals.push(lambda_params);
                if let Some(body) = lambda_body {
                    self.resolve_expr(body);
                }
                self.locals.pop();
                builtins::any_type()
            }
            ExprKind::AnonymousObject { .. } => builtins::any_type(),
            ExprKind::When { branches } => {
                let mut branch_types = Vec::new();
                for &branch in branches {
                    branch_types.push(self.resolve_expr(branch));
                }
                branch_types
                    .into_iter()
                    .reduce(|a, b| if a == b { a } else { builtins::any_type() })
                    .unwrap_or_else(builtins::unit_type)
            }
            ExprKind::Loop { body, .. } => {
                self.resolve_expr(*body);
                builtins::unit_type()
            }
            ExprKind::Jump { target, .. } => {
                if target.is_none() {
                    self.engine.sink.report_on(
                        &expr.source,
                        diagnostics::BREAK_OR_CONTINUE_OUTSIDE_OF_LOOP,
                        &[],
                    );
                }
                builtins::nothing_type()
            }
            ExprKind::Return { value } => {
                if let Some(value) = value {
                    self.resolve_expr(*value);
                }
                builtins::nothing_type()
            }
        };
        expr.resolve_type(ty.clone());
        ty
    }

    fn resolve_name(&mut self, name: &Name, source: &tarn_common::SourceElement) -> Type {
        for frame in self.locals.iter().rev() {
            if let Some(ty) = frame.get(name) {
                return ty.clone();
            }
        }
        if let Some(ty) = self.params.get(name) {
            return ty.clone();
        }
        if let Some(class) = self.containing_class {
            let scope = self.session().combined_member_scope(class);
            let members = scope.callables_by_name(name);
            if let Some(member) = members.iter().find(|member| member.signature.is_property) {
                return member.signature.return_type.clone();
            }
        }
        let package = self.engine.package_of_file(self.file);
        let top_level = self.session().provider.find_top_level_callables(&package, name);
        for symbol in top_level {
            if self.session().graph.symbol_kind(symbol) == SymbolKind::Property {
                let cell = self.session().graph.cell_of(symbol);
                let decl = cell.read();
                if let Some(property) = decl.as_property() {
                    return property
                        .type_ref
                        .ty()
                        .unwrap_or_else(|| Type::error("unresolved property type"));
                }
            }
        }
        self.engine.report_unresolved(source, name.as_str());
        Type::error(format!("unresolved reference: {name}"))
    }

    fn resolve_call_expr(
        &mut self,
        call: tarn_binder::ExprId,
        callee_name: &Name,
        receiver: Option<tarn_binder::ExprId>,
        args: &[tarn_binder::ExprId],
        is_safe: bool,
        source: &tarn_common::SourceElement,
    ) -> Type {
        let receiver_type = receiver.map(|receiver| self.resolve_expr(receiver));
        let arg_types: Vec<Type> = args.iter().map(|&arg| self.resolve_expr(arg)).collect();

        let candidates: Vec<SymbolId> = match &receiver_type {
            Some(receiver_type) => {
                let receiver_view = receiver_type.unwrap_flexible_and_definitely_not_null();
                match receiver_view {
                    SimpleType::Class(class) => {
                        match self.session().provider.find_class(class.tag.class_id()) {
                            Some(class_symbol) => {
                                let scope = self.session().combined_member_scope(class_symbol);
                                scope
                                    .callables_by_name(callee_name)
                                    .iter()
                                    .map(|member| member.symbol)
                                    .collect()
                            }
                            None => Vec::new(),
                        }
                    }
                    _ => Vec::new(),
                }
            }
            None => {
                let mut candidates = Vec::new();
                if let Some(class) = self.containing_class {
                    let scope = self.session().combined_member_scope(class);
                    candidates.extend(
                        scope
                            .callables_by_name(callee_name)
                            .iter()
                            .map(|member| member.symbol),
                    );
                }
                let package = self.engine.package_of_file(self.file);
                candidates.extend(
                    self.session()
                        .provider
                        .find_top_level_callables(&package, callee_name),
                );
                if candidates.is_empty() {
                    // `Foo(...)` with no callable in scope is a constructor
                    // call when Foo names a class.
                    let class_id = ClassId::top_level(package, callee_name.clone());
                    if let Some(class_symbol) = self.session().provider.find_class(&class_id) {
                        candidates.extend(self.constructors_of(class_symbol));
                    }
                }
                candidates
            }
        };

        let expr = self.session().graph.expr(call);
        match resolve_call(self.session(), &candidates, &arg_types, &self.relation) {
            CallResolution::Resolved {
                symbol,
                return_type,
            } => {
                expr.resolve_call(ResolvedCall { callee: symbol });
                let return_type = self.instantiate_generic_return(symbol, &arg_types, return_type);
                // A safe call only injects null when the receiver can
                // actually be null; on a non-null receiver the result type
                // is unchanged (the checker warns about the useless `?.`).
                let receiver_can_be_null = receiver_type
                    .as_ref()
                    .is_some_and(|ty| ty.nullability() != Nullability::NotNull);
                if is_safe && receiver_can_be_null {
                    return_type.with_nullability(Nullability::Nullable)
                } else {
                    return_type
                }
            }
            CallResolution::Ambiguous(_) => {
                self.engine.sink.report_on(
                    source,
                    diagnostics::OVERLOAD_RESOLUTION_AMBIGUITY,
                    &[callee_name.as_str()],
                );
                Type::error(format!("ambiguous call to {callee_name}"))
            }
            CallResolution::NoneApplicable => {
                self.engine
                    .sink
                    .report_on(source, diagnostics::NONE_APPLICABLE, &[callee_name.as_str()]);
                Type::error(format!("no applicable candidate for {callee_name}"))
            }
            CallResolution::NoCandidates => {
                self.engine.report_unresolved(source, callee_name.as_str());
                Type::error(format!("unresolved reference: {callee_name}"))
            }
        }
    }

    fn constructors_of(&self, class_symbol: SymbolId) -> Vec<SymbolId> {
        let cell = self.session().graph.cell_of(class_symbol);
        let decl = cell.read();
        let Some(class) = decl.as_class() else {
            return Vec::new();
        };
        class
            .members
            .iter()
            .filter_map(|&member| {
                let member_cell = self.session().graph.cell(member);
                let symbol = member_cell.symbol();
                let is_ctor = member_cell.read().name.as_str() == "<init>";
                is_ctor.then_some(symbol)
            })
            .collect()
    }

    /// For calls to generic functions, run the argument types through the
    /// constraint solver to concretize type parameters in the return type.
    fn instantiate_generic_return(
        &mut self,
        symbol: SymbolId,
        arg_types: &[Type],
        declared_return: Type,
    ) -> Type {
        let cell = self.session().graph.cell_of(symbol);
        let decl = cell.read();
        let Some(function) = decl.as_function() else {
            return declared_return;
        };
        if function.type_params.is_empty() {
            return declared_return;
        }

        let mut inference = InferenceContext::new();
        let vars: FxHashMap<TypeParameterId, crate::infer::InferenceVar> = function
            .type_params
            .iter()
            .map(|param| (param.id, inference.fresh_var()))
            .collect();

        for (param, arg) in function.params.iter().zip(arg_types) {
            let param_type = param.type_ref.resolved_type();
            if let Type::Simple(SimpleType::TypeParameter(type_param)) = &param_type {
                if let Some(&var) = vars.get(&type_param.id) {
                    let _ = inference.add_lower_bound(var, arg.clone(), &self.relation);
                }
            }
        }

        let mut substitutor = tarn_types::TypeSubstitutor::empty();
        for (param_id, var) in &vars {
            match inference.resolve_var(*var, &self.relation) {
                Ok(ty) => substitutor.bind(*param_id, ty),
                Err(_) => substitutor.bind(
                    *param_id,
                    Type::error("cannot infer a type argument for this call"),
                ),
            }
        }
        substitutor.substitute(&declared_return)
    }
}
