#![forbid(unsafe_code)]

//! Type predicate library
//!
//! Structural tests over canonical types. Each predicate returns the bound
//! sub-nodes a diagnostic needs (the managed type it found, the offending
//! specialization) instead of a bare boolean, so rules can compose them
//! without re-deriving context.

use crate::config::NamesConfig;
use crate::host::ast::{
    FunctionDecl, RecordId, TemplateArgument, TranslationUnit, Type, qualified_name_is,
};
use std::collections::HashSet;

/// A specialization of a watched template holding a managed type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecializationMatch {
    /// The offending specialization, e.g. `optional<Node>`
    pub specialization: RecordId,
    /// The managed type found among its arguments
    pub managed: RecordId,
}

/// Returns true if `name` matches any of the qualified `patterns`
pub fn has_any_name(name: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| qualified_name_is(name, pattern))
}

/// Structural predicates bound to one translation unit and the name tables
#[derive(Debug, Clone, Copy)]
pub struct TypePredicates<'a> {
    tu: &'a TranslationUnit,
    names: &'a NamesConfig,
}

impl<'a> TypePredicates<'a> {
    pub fn new(tu: &'a TranslationUnit, names: &'a NamesConfig) -> Self {
        Self { tu, names }
    }

    pub fn unit(&self) -> &'a TranslationUnit {
        self.tu
    }

    pub fn names(&self) -> &'a NamesConfig {
        self.names
    }

    /// IsManagedType: the canonical type is a record strictly derived from a
    /// managed-allocation base, or an array of such a type. Returns the record.
    pub fn is_managed_type(&self, ty: &Type) -> Option<RecordId> {
        match ty.canonical() {
            Type::Record { record } => self.is_derived_from_managed(*record).then_some(*record),
            Type::Array { element } => self.is_managed_type(element),
            _ => None,
        }
    }

    /// True if any transitive base of `record` is one of the managed bases
    pub fn is_derived_from_managed(&self, record: RecordId) -> bool {
        let mut visited = HashSet::new();
        let mut pending = match self.tu.record(record) {
            Some(decl) => decl.bases.clone(),
            None => return false,
        };

        while let Some(base) = pending.pop() {
            if !visited.insert(base) {
                continue;
            }
            let Some(base_decl) = self.tu.record(base) else {
                continue;
            };
            if has_any_name(&base_decl.name, &self.names.managed_bases) {
                return true;
            }
            pending.extend(base_decl.bases.iter().copied());
        }
        false
    }

    /// True if the template argument is a type argument referring to a managed type
    pub fn refers_to_managed(&self, arg: &TemplateArgument) -> Option<RecordId> {
        arg.as_type().and_then(|ty| self.is_managed_type(ty))
    }

    /// Checks the argument at `index`; a missing argument is no match
    fn argument_is_managed(&self, args: &[TemplateArgument], index: usize) -> Option<RecordId> {
        args.get(index).and_then(|arg| self.refers_to_managed(arg))
    }

    /// IsUnsafeOwnershipContainer for factory calls: `function` is one of the
    /// named sole-ownership factories and its first template argument is managed
    pub fn is_unsafe_ownership_factory(
        &self,
        function: &FunctionDecl,
        factories: &[String],
    ) -> Option<RecordId> {
        if !has_any_name(&function.name, factories) {
            return None;
        }
        self.argument_is_managed(&function.template_args, 0)
    }

    /// IsUnsafeOwnershipContainer for types: `record` specializes one of
    /// `templates` and its element argument is managed
    pub fn is_unsafe_ownership_container(
        &self,
        record: RecordId,
        templates: &[String],
    ) -> Option<SpecializationMatch> {
        let decl = self.tu.record(record)?;
        if !decl.is_specialization() || !has_any_name(&decl.name, templates) {
            return None;
        }
        let managed = self.argument_is_managed(&decl.template_args, 0)?;
        Some(SpecializationMatch {
            specialization: record,
            managed,
        })
    }

    /// IsUnsafeOptionalOf: the type is an optional-wrapper specialization
    /// whose single argument is managed
    pub fn is_unsafe_optional_of(&self, ty: &Type) -> Option<SpecializationMatch> {
        let record = ty.as_record()?;
        self.is_unsafe_ownership_container(record, &self.names.optional_templates)
    }

    /// IsUnsafeVariantOf: the record is a variant specialization where any
    /// element of any argument pack is managed
    pub fn is_unsafe_variant_of(&self, record: RecordId) -> Option<SpecializationMatch> {
        let decl = self.tu.record(record)?;
        if !has_any_name(&decl.name, &self.names.variant_templates) {
            return None;
        }
        let managed = decl
            .template_args
            .iter()
            .find_map(|arg| self.pack_has_any_managed_element(arg))?;
        Some(SpecializationMatch {
            specialization: record,
            managed,
        })
    }

    /// Scans a parameter pack, stopping at the first managed element.
    /// Anything other than a pack never matches.
    pub fn pack_has_any_managed_element(&self, arg: &TemplateArgument) -> Option<RecordId> {
        let TemplateArgument::Pack { elements } = arg else {
            return None;
        };
        for element in elements {
            if let Some(managed) = self.refers_to_managed(element) {
                return Some(managed);
            }
        }
        None
    }

    /// True if the type names one of the managed-reference wrappers, either
    /// through its canonical record or through an alias template
    pub fn is_member_wrapper(&self, ty: &Type) -> bool {
        let wrappers = &self.names.member_wrappers;
        if ty
            .alias_templates()
            .any(|template| has_any_name(template, wrappers))
        {
            return true;
        }
        ty.as_record()
            .and_then(|record| self.tu.record(record))
            .is_some_and(|decl| has_any_name(&decl.name, wrappers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ast::RecordDecl;
    use crate::host::source::SourceLocation;

    const GC_BASE: RecordId = RecordId(0);
    const NODE: RecordId = RecordId(1);
    const ELEMENT: RecordId = RecordId(2);
    const PLAIN: RecordId = RecordId(3);
    const MIXIN: RecordId = RecordId(4);
    const WITH_MIXIN: RecordId = RecordId(5);

    fn record(name: &str, bases: Vec<RecordId>, args: Vec<TemplateArgument>) -> RecordDecl {
        RecordDecl {
            name: name.to_string(),
            template_args: args,
            bases,
            location: SourceLocation::default(),
            annotations: vec![],
        }
    }

    fn ty_arg(id: RecordId) -> TemplateArgument {
        TemplateArgument::of_type(Type::record(id))
    }

    fn base_unit() -> TranslationUnit {
        TranslationUnit {
            records: vec![
                record("cppgc::GarbageCollected", vec![], vec![ty_arg(NODE)]),
                record("blink::Node", vec![GC_BASE], vec![]),
                record("blink::Element", vec![NODE], vec![]),
                record("base::Plain", vec![], vec![]),
                record("blink::GarbageCollectedMixin", vec![], vec![]),
                record("blink::Observer", vec![PLAIN, MIXIN], vec![]),
            ],
            ..Default::default()
        }
    }

    fn with_record(mut tu: TranslationUnit, decl: RecordDecl) -> (TranslationUnit, RecordId) {
        tu.records.push(decl);
        let id = RecordId(tu.records.len() as u32 - 1);
        (tu, id)
    }

    #[test]
    fn test_is_managed_type() {
        let tu = base_unit();
        let names = NamesConfig::default();
        let p = TypePredicates::new(&tu, &names);

        assert_eq!(p.is_managed_type(&Type::record(NODE)), Some(NODE));
        assert_eq!(p.is_managed_type(&Type::record(ELEMENT)), Some(ELEMENT));
        assert_eq!(p.is_managed_type(&Type::record(WITH_MIXIN)), Some(WITH_MIXIN));
        assert_eq!(p.is_managed_type(&Type::record(PLAIN)), None);
        // Derivation is strict: the base itself is not a managed type
        assert_eq!(p.is_managed_type(&Type::record(GC_BASE)), None);
        assert_eq!(p.is_managed_type(&Type::pointer_to(Type::record(NODE))), None);
        assert_eq!(p.is_managed_type(&Type::Dependent), None);
        assert_eq!(p.is_managed_type(&Type::record(RecordId(42))), None);
    }

    #[test]
    fn test_is_managed_type_arrays_and_aliases() {
        let tu = base_unit();
        let names = NamesConfig::default();
        let p = TypePredicates::new(&tu, &names);

        let array = Type::array_of(Type::record(NODE));
        assert_eq!(p.is_managed_type(&array), Some(NODE));
        let nested = Type::array_of(Type::array_of(Type::record(ELEMENT)));
        assert_eq!(p.is_managed_type(&nested), Some(ELEMENT));
        let alias = Type::Alias {
            name: "NodeAlias".to_string(),
            template: None,
            aliased: Box::new(Type::record(NODE)),
        };
        assert_eq!(p.is_managed_type(&alias), Some(NODE));
        assert_eq!(p.is_managed_type(&Type::array_of(Type::builtin("int"))), None);
    }

    #[test]
    fn test_unsafe_ownership_factory() {
        let tu = base_unit();
        let names = NamesConfig::default();
        let p = TypePredicates::new(&tu, &names);

        let make_unique = |arg| FunctionDecl {
            name: "std::make_unique".to_string(),
            template_args: vec![arg],
            location: SourceLocation::default(),
        };
        assert_eq!(
            p.is_unsafe_ownership_factory(&make_unique(ty_arg(NODE)), &names.unique_factories),
            Some(NODE)
        );
        assert_eq!(
            p.is_unsafe_ownership_factory(&make_unique(ty_arg(PLAIN)), &names.unique_factories),
            None
        );

        let other = FunctionDecl {
            name: "std::make_shared".to_string(),
            template_args: vec![ty_arg(NODE)],
            location: SourceLocation::default(),
        };
        assert_eq!(
            p.is_unsafe_ownership_factory(&other, &names.unique_factories),
            None
        );

        let no_args = FunctionDecl {
            name: "base::WrapUnique".to_string(),
            template_args: vec![],
            location: SourceLocation::default(),
        };
        assert_eq!(
            p.is_unsafe_ownership_factory(&no_args, &names.unique_factories),
            None
        );
    }

    #[test]
    fn test_unsafe_optional_of() {
        let names = NamesConfig::default();
        let (tu, optional_node) =
            with_record(base_unit(), record("absl::optional", vec![], vec![ty_arg(NODE)]));
        let (tu, optional_plain) =
            with_record(tu, record("absl::optional", vec![], vec![ty_arg(PLAIN)]));
        let (tu, vector_node) =
            with_record(tu, record("std::vector", vec![], vec![ty_arg(NODE)]));
        let p = TypePredicates::new(&tu, &names);

        assert_eq!(
            p.is_unsafe_optional_of(&Type::record(optional_node)),
            Some(SpecializationMatch {
                specialization: optional_node,
                managed: NODE
            })
        );
        assert_eq!(p.is_unsafe_optional_of(&Type::record(optional_plain)), None);
        assert_eq!(p.is_unsafe_optional_of(&Type::record(vector_node)), None);
        assert_eq!(p.is_unsafe_optional_of(&Type::builtin("int")), None);
    }

    fn variant_of(tu: TranslationUnit, elements: Vec<TemplateArgument>) -> (TranslationUnit, RecordId) {
        with_record(
            tu,
            record(
                "absl::variant",
                vec![],
                vec![TemplateArgument::pack(elements)],
            ),
        )
    }

    #[test]
    fn test_variant_pack_scan_positions() {
        let names = NamesConfig::default();
        let int = || TemplateArgument::of_type(Type::builtin("int"));

        let cases: Vec<(Vec<TemplateArgument>, Option<RecordId>)> = vec![
            (vec![], None),
            (vec![int()], None),
            (vec![int(), ty_arg(PLAIN), int()], None),
            (vec![ty_arg(NODE)], Some(NODE)),
            (vec![ty_arg(NODE), int(), int()], Some(NODE)),
            (vec![int(), ty_arg(ELEMENT), int()], Some(ELEMENT)),
            (vec![int(), int(), ty_arg(NODE)], Some(NODE)),
            // Several managed elements: the first one wins
            (vec![ty_arg(ELEMENT), ty_arg(NODE)], Some(ELEMENT)),
        ];

        for (elements, expected) in cases {
            let (tu, variant) = variant_of(base_unit(), elements.clone());
            let p = TypePredicates::new(&tu, &names);
            assert_eq!(
                p.is_unsafe_variant_of(variant).map(|m| m.managed),
                expected,
                "elements: {:?}",
                elements
            );
        }
    }

    #[test]
    fn test_variant_requires_pack() {
        let names = NamesConfig::default();
        // A plain type argument is not a pack and does not match
        let (tu, variant) = with_record(
            base_unit(),
            record("absl::variant", vec![], vec![ty_arg(NODE)]),
        );
        let p = TypePredicates::new(&tu, &names);
        assert_eq!(p.is_unsafe_variant_of(variant), None);
        assert_eq!(p.pack_has_any_managed_element(&ty_arg(NODE)), None);
    }

    #[test]
    fn test_member_wrapper() {
        let names = NamesConfig::default();
        let (tu, member) = with_record(
            base_unit(),
            record("blink::Member", vec![], vec![ty_arg(NODE)]),
        );
        let (tu, basic_member) = with_record(
            tu,
            record("cppgc::internal::BasicMember", vec![], vec![ty_arg(NODE)]),
        );
        let p = TypePredicates::new(&tu, &names);

        assert!(p.is_member_wrapper(&Type::record(member)));
        assert!(p.is_member_wrapper(&Type::record(basic_member)));
        let via_alias_template = Type::Alias {
            name: "Member<Node>".to_string(),
            template: Some("blink::WeakMember".to_string()),
            aliased: Box::new(Type::record(PLAIN)),
        };
        assert!(p.is_member_wrapper(&via_alias_template));
        assert!(!p.is_member_wrapper(&Type::record(NODE)));
        assert!(!p.is_member_wrapper(&Type::pointer_to(Type::record(member))));
    }
}
