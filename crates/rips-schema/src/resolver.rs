//! # Dependency Resolver
//!
//! Computes defaults and mutability overrides for fields whose correct value
//! depends on other parts of the same document, following the privileged
//! architecture rules for `misa`, `mstatus`, `mideleg` and `medeleg`.
//!
//! ## Binding
//!
//! Resolvers are identified by [`ResolverId`] and attached to schema paths
//! through the static [`RESOLVER_BINDINGS`] table. Binding to a path the
//! schema does not declare fails at load time with
//! [`ConfigurationError::UnboundPath`].
//!
//! ## Evaluation Inputs
//!
//! Every resolver is a pure function of the [`CapabilitySet`] and the
//! [`OriginalDocument`]. No resolver reads another field's resolved value,
//! so evaluation order across fields does not matter and each resolver runs
//! exactly once per [`resolve`] call.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rips_core::{CapabilitySet, ConfigurationError, FieldPath, OriginalDocument};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{as_i128, SchemaField, SchemaTree, ValueType};

/// Identifier of a dependency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverId {
    /// `misa.Extensions.readonly`: read-only unless a positive base bitmask is declared.
    ExtensionsReadonly,
    /// `implemented` is true iff `S` is declared.
    SupervisorImplemented,
    /// `implemented` is true iff `U` is declared.
    UserImplemented,
    /// Hardwired to 0 without `S`.
    SupervisorGated,
    /// Hardwired to 0 without `U`.
    UserGated,
    /// Hardwired to 0 without `U`; otherwise a supplied value passes through untouched.
    UserInterruptEnable,
    /// Hardwired to 0 when neither `S` nor `U` is declared.
    TrapWfi,
    /// Delegation registers exist only with `U` plus one of `N` or `S`.
    DelegationImplemented,
}

impl ResolverId {
    pub fn name(self) -> &'static str {
        match self {
            Self::ExtensionsReadonly => "extensions_readonly",
            Self::SupervisorImplemented => "supervisor_implemented",
            Self::UserImplemented => "user_implemented",
            Self::SupervisorGated => "supervisor_gated",
            Self::UserGated => "user_gated",
            Self::UserInterruptEnable => "user_interrupt_enable",
            Self::TrapWfi => "trap_wfi",
            Self::DelegationImplemented => "delegation_implemented",
        }
    }

    /// Evaluate this rule for the field at `path`.
    pub fn evaluate(
        self,
        path: &FieldPath,
        caps: &CapabilitySet,
        original: &OriginalDocument,
    ) -> Resolution {
        match self {
            Self::ExtensionsReadonly => {
                let base = original
                    .field(&bitmask_base_path())
                    .and_then(as_i128)
                    .unwrap_or(0);
                Resolution::Literal(Value::Bool(base <= 0))
            }
            Self::SupervisorImplemented => Resolution::Literal(Value::Bool(caps.has_supervisor())),
            Self::UserImplemented => Resolution::Literal(Value::Bool(caps.has_user())),
            Self::SupervisorGated => gated_on(caps.has_supervisor()),
            Self::UserGated => gated_on(caps.has_user()),
            Self::UserInterruptEnable => {
                if !caps.has_user() {
                    return Resolution::Constraint(ConstraintOverride::hardwired_zero());
                }
                match original.field(path) {
                    None => Resolution::Constraint(ConstraintOverride::writable()),
                    Some(supplied) => Resolution::Literal(supplied.clone()),
                }
            }
            Self::TrapWfi => gated_on(caps.has_supervisor() || caps.has_user()),
            Self::DelegationImplemented => Resolution::Literal(Value::Bool(
                caps.has_user() && (caps.has_user_interrupts() || caps.has_supervisor()),
            )),
        }
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn gated_on(present: bool) -> Resolution {
    if present {
        Resolution::Constraint(ConstraintOverride::writable())
    } else {
        Resolution::Constraint(ConstraintOverride::hardwired_zero())
    }
}

fn bitmask_base_path() -> FieldPath {
    FieldPath::root()
        .child("misa")
        .child("Extensions")
        .child("bitmask")
        .child("base")
}

/// Mutability override produced by a resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintOverride {
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardwired: Option<Value>,
}

impl ConstraintOverride {
    /// Read-only, fixed at zero.
    pub fn hardwired_zero() -> Self {
        Self {
            readonly: true,
            hardwired: Some(Value::from(0)),
        }
    }

    /// Freely configurable.
    pub fn writable() -> Self {
        Self {
            readonly: false,
            hardwired: None,
        }
    }

    /// The bit-descriptor mapping (`{readonly, hardwired?}`) for this override.
    pub fn descriptor(&self) -> Value {
        let mut map = Map::new();
        map.insert("readonly".to_string(), Value::Bool(self.readonly));
        if let Some(hardwired) = &self.hardwired {
            map.insert("hardwired".to_string(), hardwired.clone());
        }
        Value::Object(map)
    }
}

/// Outcome of evaluating one resolver.
///
/// `Literal` replaces default computation entirely (including passing a
/// user-supplied value through unchanged). `Constraint` overrides the
/// field's mutability and, when read-only, its fixed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Literal(Value),
    Constraint(ConstraintOverride),
}

/// One entry of the static binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverBinding {
    pub path: &'static str,
    pub resolver: ResolverId,
}

const fn bind(path: &'static str, resolver: ResolverId) -> ResolverBinding {
    ResolverBinding { path, resolver }
}

/// Standard bindings for the bundled schema.
pub const RESOLVER_BINDINGS: &[ResolverBinding] = &[
    bind("misa.Extensions.readonly", ResolverId::ExtensionsReadonly),
    bind("mstatus.SXL.implemented", ResolverId::SupervisorImplemented),
    bind("mstatus.UXL.implemented", ResolverId::UserImplemented),
    bind("mstatus.TVM", ResolverId::SupervisorGated),
    bind("mstatus.TSR", ResolverId::SupervisorGated),
    bind("mstatus.MXR", ResolverId::SupervisorGated),
    bind("mstatus.SUM", ResolverId::SupervisorGated),
    bind("mstatus.SPP", ResolverId::SupervisorGated),
    bind("mstatus.SPIE", ResolverId::SupervisorGated),
    bind("mstatus.SIE", ResolverId::SupervisorGated),
    bind("mstatus.UPIE", ResolverId::UserInterruptEnable),
    bind("mstatus.UIE", ResolverId::UserInterruptEnable),
    bind("mstatus.MPRV", ResolverId::UserGated),
    bind("mstatus.TW", ResolverId::TrapWfi),
    bind("mideleg.implemented", ResolverId::DelegationImplemented),
    bind("medeleg.implemented", ResolverId::DelegationImplemented),
];

/// Attach resolvers to schema fields.
///
/// # Errors
///
/// - [`ConfigurationError::InvalidBindingPath`] for a malformed path.
/// - [`ConfigurationError::DuplicateBinding`] if a path is bound twice.
/// - [`ConfigurationError::UnboundPath`] if the schema lacks the path.
pub fn register_default_resolvers(
    mut tree: SchemaTree,
    bindings: &[ResolverBinding],
) -> Result<SchemaTree, ConfigurationError> {
    let mut seen = BTreeSet::new();
    for binding in bindings {
        let path = FieldPath::parse(binding.path)?;
        if !seen.insert(path.clone()) {
            return Err(ConfigurationError::DuplicateBinding {
                path: binding.path.to_string(),
            });
        }
        let field = tree
            .field_mut(&path)
            .ok_or_else(|| ConfigurationError::UnboundPath {
                path: binding.path.to_string(),
                resolver: binding.resolver.name().to_string(),
            })?;
        field.bind_resolver(binding.resolver);
    }
    Ok(tree)
}

/// A schema together with every resolution computed for one run.
#[derive(Debug, Clone)]
pub struct ResolvedSchema<'a> {
    schema: &'a SchemaTree,
    capabilities: CapabilitySet,
    resolutions: BTreeMap<FieldPath, Resolution>,
}

/// Evaluate every bound resolver once against the capability set and the
/// unmodified original document.
pub fn resolve<'a>(
    schema: &'a SchemaTree,
    caps: &CapabilitySet,
    original: &OriginalDocument,
) -> ResolvedSchema<'a> {
    let resolutions = schema
        .walk()
        .into_iter()
        .filter_map(|(path, field)| {
            let resolver = field.resolver()?;
            let resolution = resolver.evaluate(&path, caps, original);
            tracing::debug!(
                path = %path,
                resolver = resolver.name(),
                resolution = ?resolution,
                "resolved field default"
            );
            Some((path, resolution))
        })
        .collect();

    ResolvedSchema {
        schema,
        capabilities: caps.clone(),
        resolutions,
    }
}

impl<'a> ResolvedSchema<'a> {
    pub fn schema(&self) -> &'a SchemaTree {
        self.schema
    }

    /// The capability set the resolutions were computed against.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn resolution(&self, path: &FieldPath) -> Option<&Resolution> {
        self.resolutions.get(path)
    }

    /// All resolutions, ordered by path.
    pub fn resolutions(&self) -> impl Iterator<Item = (&FieldPath, &Resolution)> {
        self.resolutions.iter()
    }

    /// The value the normalizer substitutes when `field` is absent.
    ///
    /// A constraint on a dict field, from a resolver or the static
    /// `readonly` rule, yields its bit descriptor; on a scalar field it
    /// yields the hardwired value, falling back to the static default.
    pub fn effective_default(&self, path: &FieldPath, field: &SchemaField) -> Option<Value> {
        match self.resolutions.get(path) {
            Some(Resolution::Literal(value)) => Some(value.clone()),
            Some(Resolution::Constraint(c)) if field.value_type() == ValueType::Dict => {
                Some(c.descriptor())
            }
            Some(Resolution::Constraint(c)) => c
                .hardwired
                .clone()
                .or_else(|| field.static_default().cloned()),
            None if field.is_static_readonly() => {
                let constraint = ConstraintOverride {
                    readonly: true,
                    hardwired: field.static_hardwired().cloned(),
                };
                if field.value_type() == ValueType::Dict {
                    Some(constraint.descriptor())
                } else {
                    constraint.hardwired.or_else(|| field.static_default().cloned())
                }
            }
            None => field.static_default().cloned(),
        }
    }

    /// The mutability constraint in force for `field`: the resolver's
    /// override when there is one, otherwise the static `readonly` rule.
    pub fn effective_constraint(
        &self,
        path: &FieldPath,
        field: &SchemaField,
    ) -> Option<ConstraintOverride> {
        match self.resolutions.get(path) {
            Some(Resolution::Constraint(c)) => Some(c.clone()),
            _ if field.is_static_readonly() => Some(ConstraintOverride {
                readonly: true,
                hardwired: field.static_hardwired().cloned(),
            }),
            _ => None,
        }
    }
}
