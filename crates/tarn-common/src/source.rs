//! Source element anchoring for declaration-graph nodes and diagnostics.
//!
//! Every node in the typed declaration graph points back at the text it came
//! from through a [`SourceElement`]. An element is either *real* (one-to-one
//! with a syntax node) or *fake* (compiler-synthesized, tagged with the
//! desugaring that produced it). Fake kinds exist so that the builder can
//! hang several graph nodes off one piece of syntax without violating the
//! rule that no two graph nodes share the same real element.

use serde::Serialize;

/// Half-open `[start, end)` span of UTF-8 byte offsets within one file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted text range {start}..{end}");
        TextRange { start, end }
    }

    pub fn empty_at(offset: u32) -> Self {
        TextRange {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Identity of a source file within one analysis session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// Opaque handle to a node in a syntax arena. Only the arena that produced
/// the handle can interpret `index`; everyone else treats the pair as an
/// identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SyntaxNodeHandle {
    pub file: FileId,
    pub index: u32,
}

/// What kind of desugaring produced a fake source element.
///
/// Each variant names the synthesis that created the graph node; checkers
/// key exemptions off these (a default accessor is not a user-written
/// accessor, a smart-cast type ref is not a user-written type ref, and so
/// on).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FakeElementKind {
    /// A declaration had no written type; the type ref was synthesized.
    ImplicitTypeRef,
    /// The self-type reference a class declaration implies.
    ClassSelfTypeRef,
    /// Type ref synthesized while recovering from a resolution error.
    ErrorTypeRef,
    /// Getter/setter generated for a property that declared none.
    DefaultAccessor,
    /// Accessor generated to forward to a property delegate.
    DelegatedPropertyAccessor,
    /// Constructor generated for a class that declared none.
    ImplicitConstructor,
    /// Type parameter copied from the class onto a constructor.
    ConstructorTypeParameter,
    /// `this(...)`/`super(...)` call synthesized for a delegating constructor.
    DelegatingConstructorCall,
    /// Initializer object generated for an enum entry with a body.
    EnumInitializer,
    /// Label generated for a lambda so non-local jumps can target it.
    GeneratedLambdaLabel,
    /// Modifier list left dangling by incomplete code.
    DanglingModifierList,
    /// Return synthesized from an expression-body function.
    ImplicitReturnFromExpressionBody,
    /// Return synthesized from the last statement of a block body.
    ImplicitReturnFromLastStatement,
    /// Unit value synthesized where a value was required.
    ImplicitUnit,
    /// Wrapper around a property delegate expression.
    WrappedDelegate,
    /// Iterator/next/hasNext calls desugared from a for-loop.
    DesugaredForLoop,
    /// `x(...)` rewritten to `x.invoke(...)`.
    ImplicitInvokeCall,
    /// Second reference to a receiver in an atomic qualified access.
    ReferenceInAtomicQualifiedAccess,
    /// `values`/`valueOf`/`entries` members generated for an enum class.
    EnumGeneratedDeclaration,
    /// Condition synthesized for a `when` branch.
    WhenCondition,
    /// Property generated from a constructor `val`/`var` parameter.
    PropertyFromParameter,
    /// Block wrapped around a single-expression body.
    SingleExpressionBlock,
    /// Contract description block lifted out of a function body.
    ContractBlock,
    /// Desugaring of `++`/`--`.
    DesugaredIncrementOrDecrement,
    /// Name reference synthesized for a prefix inc/dec operand.
    DesugaredPrefixNameReference,
    /// Name reference synthesized for a postfix inc/dec operand.
    DesugaredPostfixNameReference,
    /// `!(a in b)` desugared from `a !in b`.
    DesugaredInvertedContains,
    /// equals/hashCode/toString/copy/componentN generated for a data class.
    DataClassGeneratedMembers,
    /// Array type synthesized for a vararg parameter.
    ArrayTypeFromVarargParameter,
    /// `componentN()` call desugared from a destructuring declaration.
    DesugaredComponentFunctionCall,
    /// Type ref narrowed by a smart cast.
    SmartCastedTypeRef,
    /// Expression wrapper recording a smart cast.
    SmartCastExpression,
    /// `a?.b` desugared into a checked receiver access.
    DesugaredSafeCallExpression,
    /// Subject variable of a desugared safe call.
    CheckedSafeCallSubject,
    /// `a += b` desugared into `a = a + b` or `a.plusAssign(b)`.
    DesugaredCompoundAssignment,
    /// `compareTo` call generated for `<`, `>`, `<=`, `>=`.
    GeneratedComparisonExpression,
    /// Subject variable generated for `when` with a subject.
    WhenGeneratedSubject,
    /// Name reference synthesized for `a[i]` access.
    ArrayAccessNameReference,
    /// Index expression reference inside a desugared array access.
    ArrayIndexExpressionReference,
    /// Implicit supertype on a super call with no explicit type.
    SuperCallImplicitType,
    /// Explicit supertype copied onto a super call.
    SuperCallExplicitType,
    /// Individual argument spread from a vararg.
    VarargArgument,
    /// Implicit `it` parameter of a lambda.
    ItLambdaParameter,
    /// Field storing the delegate of class delegation.
    ClassDelegationField,
    /// Widening conversion inserted between integer literals.
    IntToLongConversion,
    /// Receiver made explicit by resolution.
    ImplicitReceiver,
    /// Call entirely synthesized by resolution (e.g. when-exhaustiveness).
    SyntheticCall,
    /// Property type inherited from its getter return type.
    PropertyTypeFromGetterReturnType,
    /// Member synthesized into a subclass for an inherited, non-overridden
    /// supertype member, with the supertype's type parameters substituted.
    FakeOverride,
}

impl FakeElementKind {
    /// Whether checkers should stay quiet about error types sitting on an
    /// element of this kind. These positions have no user-written type to
    /// anchor a message to; the error surfaces on the real element instead.
    pub fn skip_error_type_reporting(&self) -> bool {
        matches!(
            self,
            FakeElementKind::ImplicitTypeRef
                | FakeElementKind::DefaultAccessor
                | FakeElementKind::PropertyFromParameter
                | FakeElementKind::DataClassGeneratedMembers
                | FakeElementKind::SmartCastedTypeRef
                | FakeElementKind::SuperCallExplicitType
        )
    }
}

/// Provenance tag of a source element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// One-to-one with a node the user wrote.
    Real,
    /// Synthesized; the payload names the desugaring.
    Fake(FakeElementKind),
}

impl ElementKind {
    pub fn is_real(&self) -> bool {
        matches!(self, ElementKind::Real)
    }

    pub fn is_fake(&self) -> bool {
        !self.is_real()
    }

    pub fn skip_error_type_reporting(&self) -> bool {
        match self {
            ElementKind::Real => false,
            ElementKind::Fake(fake) => fake.skip_error_type_reporting(),
        }
    }
}

/// Immutable handle into original source text.
///
/// Equality is by file, range, and kind; the node-backed variant additionally
/// requires the same underlying tree handle when compared against another
/// node-backed element. Hashing uses only file/range/kind so the two variants
/// stay hash-compatible.
#[derive(Clone, Debug)]
pub enum SourceElement {
    Offset {
        file: FileId,
        range: TextRange,
        kind: ElementKind,
    },
    Node {
        node: SyntaxNodeHandle,
        range: TextRange,
        kind: ElementKind,
    },
}

impl SourceElement {
    pub fn real(node: SyntaxNodeHandle, range: TextRange) -> Self {
        SourceElement::Node {
            node,
            range,
            kind: ElementKind::Real,
        }
    }

    pub fn offset(file: FileId, range: TextRange, kind: ElementKind) -> Self {
        SourceElement::Offset { file, range, kind }
    }

    pub fn file(&self) -> FileId {
        match self {
            SourceElement::Offset { file, .. } => *file,
            SourceElement::Node { node, .. } => node.file,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            SourceElement::Offset { range, .. } | SourceElement::Node { range, .. } => *range,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            SourceElement::Offset { kind, .. } | SourceElement::Node { kind, .. } => *kind,
        }
    }

    pub fn is_real(&self) -> bool {
        self.kind().is_real()
    }

    /// Derive a fake element over the same text, tagged with the desugaring
    /// that is about to reuse this position.
    pub fn fake_element(&self, fake: FakeElementKind) -> SourceElement {
        match self {
            SourceElement::Offset { file, range, .. } => SourceElement::Offset {
                file: *file,
                range: *range,
                kind: ElementKind::Fake(fake),
            },
            SourceElement::Node { node, range, .. } => SourceElement::Node {
                node: *node,
                range: *range,
                kind: ElementKind::Fake(fake),
            },
        }
    }
}

impl PartialEq for SourceElement {
    fn eq(&self, other: &Self) -> bool {
        if self.file() != other.file() || self.range() != other.range() || self.kind() != other.kind()
        {
            return false;
        }
        // Two node-backed elements over the same span must also agree on the
        // underlying tree node.
        match (self, other) {
            (SourceElement::Node { node: a, .. }, SourceElement::Node { node: b, .. }) => a == b,
            _ => true,
        }
    }
}

impl Eq for SourceElement {}

impl std::hash::Hash for SourceElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.file().hash(state);
        self.range().hash(state);
        self.kind().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(file: u32, index: u32) -> SyntaxNodeHandle {
        SyntaxNodeHandle {
            file: FileId(file),
            index,
        }
    }

    #[test]
    fn offset_elements_compare_by_range_only() {
        let a = SourceElement::offset(FileId(0), TextRange::new(3, 9), ElementKind::Real);
        let b = SourceElement::offset(FileId(0), TextRange::new(3, 9), ElementKind::Real);
        let c = SourceElement::offset(FileId(0), TextRange::new(3, 10), ElementKind::Real);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn node_elements_also_compare_the_tree_handle() {
        let range = TextRange::new(0, 4);
        let a = SourceElement::real(handle(0, 1), range);
        let b = SourceElement::real(handle(0, 1), range);
        let c = SourceElement::real(handle(0, 2), range);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn mixed_variants_fall_back_to_range_equality() {
        let range = TextRange::new(5, 8);
        let node = SourceElement::real(handle(1, 7), range);
        let offset = SourceElement::offset(FileId(1), range, ElementKind::Real);
        assert_eq!(node, offset);
    }

    #[test]
    fn fake_derivation_keeps_position_and_changes_kind() {
        let real = SourceElement::real(handle(0, 3), TextRange::new(10, 20));
        let fake = real.fake_element(FakeElementKind::DefaultAccessor);
        assert_eq!(fake.range(), real.range());
        assert_ne!(fake, real);
        assert!(fake.kind().is_fake());
    }
}
