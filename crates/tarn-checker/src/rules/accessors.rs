//! Property accessor consistency: accessor types against the property type,
//! accessor visibility against property visibility, delegation exemptions.

use crate::context::CheckerContext;
use crate::errors;
use crate::registry::{DeclKindFilter, DeclarationRule, RuleSessionKind};
use std::cmp::Ordering;
use tarn_binder::{Declaration, PropertyAccessor, PropertyDecl};
use tarn_common::{ElementKind, FakeElementKind, Visibility};
use tarn_types::{Type, fully_expanded_type};

pub const RULE: DeclarationRule = DeclarationRule {
    name: "PropertyAccessorsTypes",
    applies_to: DeclKindFilter::PROPERTY,
    session: RuleSessionKind::DeclarationSite,
    check,
};

fn check(context: &CheckerContext, decl: &Declaration) {
    let Some(property) = decl.as_property() else {
        return;
    };
    check_getter(context, decl, property);
    check_setter(context, decl, property);
}

fn is_implicit_delegate_accessor(accessor: &PropertyAccessor) -> bool {
    accessor.source.kind() == ElementKind::Fake(FakeElementKind::DelegatedPropertyAccessor)
}

/// A delegated property's accessors must be the compiler-generated
/// forwarders; a hand-written body on one is reported.
fn check_accessor_for_delegated_property(
    context: &CheckerContext,
    property: &PropertyDecl,
    accessor: &PropertyAccessor,
) {
    if property.delegate.is_some()
        && accessor.body.is_some()
        && !is_implicit_delegate_accessor(accessor)
    {
        context.report_on(&accessor.source, errors::ACCESSOR_FOR_DELEGATED_PROPERTY, &[]);
    }
}

fn is_legally_abstract(context: &CheckerContext, decl: &Declaration) -> bool {
    decl.modality == tarn_common::Modality::Abstract
        && context.closest_class_can_have_abstract_members()
}

fn is_effectively_final(context: &CheckerContext, decl: &Declaration) -> bool {
    if decl.modality != tarn_common::Modality::Final {
        return false;
    }
    // Interface members are overridable regardless of the written modality.
    context.closest_class_kind() != Some(tarn_binder::ClassDeclKind::Interface)
}

fn check_getter(context: &CheckerContext, decl: &Declaration, property: &PropertyDecl) {
    let Some(getter) = &property.getter else {
        return;
    };
    let property_type = property.type_ref.resolved_type();

    check_accessor_for_delegated_property(context, property, getter);
    if is_implicit_delegate_accessor(getter) {
        return;
    }

    if getter.effective_visibility() != decl.visibility {
        context.report_on(
            &getter.source,
            errors::GETTER_VISIBILITY_DIFFERS_FROM_PROPERTY_VISIBILITY,
            &[],
        );
    }
    if decl.containing_class.is_some() && getter.body.is_some() && property.delegate.is_none() {
        if is_legally_abstract(context, decl) {
            context.report_on(&getter.source, errors::ABSTRACT_PROPERTY_WITH_GETTER, &[]);
        }
    }

    // A synthesized return-type position has nothing user-written to
    // disagree with.
    if getter.return_type.source.kind().is_fake() {
        return;
    }
    let getter_return_type = getter.return_type.resolved_type();
    if property_type.is_error() || getter_return_type.is_error() {
        return;
    }
    let expanded_property = fully_expanded_type(&property_type, context.session.as_ref());
    let expanded_getter = fully_expanded_type(&getter_return_type, context.session.as_ref());
    if expanded_getter != expanded_property {
        context.report_on(
            &getter.return_type.source,
            errors::WRONG_GETTER_RETURN_TYPE,
            &[&property_type.to_string(), &getter_return_type.to_string()],
        );
    }
}

fn check_setter(context: &CheckerContext, decl: &Declaration, property: &PropertyDecl) {
    let Some(setter) = &property.setter else {
        return;
    };
    let property_type = property.type_ref.resolved_type();

    if !property.is_var {
        context.report_on(&setter.source, errors::VAL_WITH_SETTER, &[]);
    }
    check_accessor_for_delegated_property(context, property, setter);
    if is_implicit_delegate_accessor(setter) {
        return;
    }

    let setter_visibility = setter.effective_visibility();
    match setter_visibility.compare(decl.visibility) {
        None | Some(Ordering::Greater) => {
            context.report_on(
                &setter.source,
                errors::SETTER_VISIBILITY_INCONSISTENT_WITH_PROPERTY_VISIBILITY,
                &[],
            );
        }
        Some(Ordering::Less | Ordering::Equal) => {}
    }

    if decl.containing_class.is_some() && property.delegate.is_none() {
        let legally_abstract = is_legally_abstract(context, decl);
        if setter_visibility == Visibility::Private && decl.visibility != Visibility::Private {
            if legally_abstract {
                context.report_on(&setter.source, errors::PRIVATE_SETTER_FOR_ABSTRACT_PROPERTY, &[]);
            } else if !is_effectively_final(context, decl) {
                context.report_on(&setter.source, errors::PRIVATE_SETTER_FOR_OPEN_PROPERTY, &[]);
            }
        }
        if legally_abstract && setter.body.is_some() {
            context.report_on(&setter.source, errors::ABSTRACT_PROPERTY_WITH_SETTER, &[]);
        }
    }

    let Some(value_param) = &setter.param else {
        return;
    };
    if value_param.is_vararg {
        return;
    }
    let value_type = value_param.type_ref.resolved_type();
    if property_type.is_error() || value_type.is_error() {
        return;
    }
    if strip_attributes(&value_type) != strip_attributes(&property_type) {
        context.report_on(
            &value_param.type_ref.source,
            errors::WRONG_SETTER_PARAMETER_TYPE,
            &[&property_type.to_string(), &value_type.to_string()],
        );
    }

    let setter_return_type =
        fully_expanded_type(&setter.return_type.resolved_type(), context.session.as_ref());
    if !setter_return_type.is_unit() && !setter_return_type.is_error() {
        context.report_on(&setter.return_type.source, errors::WRONG_SETTER_RETURN_TYPE, &[]);
    }
}

fn strip_attributes(ty: &Type) -> Type {
    ty.clone().with_attributes(tarn_types::TypeAttributes::empty())
}
