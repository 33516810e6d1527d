//! An extension property's delegate must not capture the property's own
//! type parameters: the delegate instance is shared across all receivers,
//! so a delegate whose type mentions them would leak one instantiation to
//! every other.

use crate::context::CheckerContext;
use crate::errors;
use crate::registry::{DeclKindFilter, DeclarationRule, RuleSessionKind};
use rustc_hash::FxHashSet;
use tarn_binder::Declaration;
use tarn_types::{SimpleType, Type, TypeParameterId, fully_expanded_type};

pub const RULE: DeclarationRule = DeclarationRule {
    name: "DelegateUsesExtensionPropertyTypeParameter",
    applies_to: DeclKindFilter::PROPERTY,
    session: RuleSessionKind::DeclarationSite,
    check,
};

fn check(context: &CheckerContext, decl: &Declaration) {
    let Some(property) = decl.as_property() else {
        return;
    };
    if !property.is_extension() {
        return;
    }
    let Some(delegate) = property.delegate else {
        return;
    };
    let parameters: FxHashSet<TypeParameterId> =
        property.type_params.iter().map(|param| param.id).collect();
    if parameters.is_empty() {
        return;
    }
    let delegate_expr = context.session.graph.expr(delegate);
    let Some(delegate_type) = delegate_expr.resolved_type() else {
        return;
    };

    if let Some(used) = find_used_type_parameter(context, delegate_type, &parameters) {
        let name = property
            .type_params
            .iter()
            .find(|param| param.id == used)
            .map(|param| param.name.as_str().to_string())
            .unwrap_or_default();
        context.report_on(
            &decl.source,
            errors::DELEGATE_USES_EXTENSION_PROPERTY_TYPE_PARAMETER,
            &[&name],
        );
    }
}

/// Walk the delegate type's arguments looking for one of the property's
/// type parameters in a position the delegate class can observe (it
/// declares a property typed by its own parameter).
fn find_used_type_parameter(
    context: &CheckerContext,
    ty: &Type,
    parameters: &FxHashSet<TypeParameterId>,
) -> Option<TypeParameterId> {
    let lowered = Type::Simple(ty.lower_bound_if_flexible().clone());
    let expanded = fully_expanded_type(&lowered, context.session.as_ref());
    let SimpleType::Class(class) = expanded.lower_bound_if_flexible().unwrap_definitely_not_null()
    else {
        return None;
    };
    let delegate_class = context.session.provider.find_class(class.tag.class_id())?;

    for argument in &class.arguments {
        let Some(argument_type) = argument.ty() else {
            continue;
        };
        if let SimpleType::TypeParameter(param) = argument_type.lower_bound_if_flexible() {
            if parameters.contains(&param.id) {
                let scope = context.session.combined_member_scope(delegate_class);
                let mut leaks = false;
                scope.process_all_properties(|member| {
                    if member
                        .signature
                        .return_type
                        .contains(&mut |ty| matches!(ty.lower_bound_if_flexible(), SimpleType::TypeParameter(_)))
                    {
                        leaks = true;
                    }
                });
                if leaks {
                    return Some(param.id);
                }
            }
        }
        if let Some(used) = find_used_type_parameter(context, argument_type, parameters) {
            return Some(used);
        }
    }
    None
}
