////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::fmt::Write;

use compact_str::CompactString;

use crate::{
    report::system_panic,
    runtime::{Semantics, Value, ValueClass},
};

/// A declarative description of one parameter of an exported function.
///
/// The export system produces this object during the introspection of an
/// exported Rust function and hands it over as a part of the
/// [function declaration](crate::runtime::FnDecl). The binding layer resolves
/// it into an immutable [ParamMeta] against the runtime configuration.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    /// The name of the parameter. Must be unique within the declaration.
    pub name: &'static str,

    /// How the argument may be supplied at a call site.
    pub kind: ParamKind,

    /// The pre-resolved default value. The parameter is required if the
    /// default is omitted.
    pub default: Option<Value>,

    /// A non-empty list of value classes the argument must satisfy.
    /// [ValueClass::Any] disables the check.
    pub allowed: Vec<ValueClass>,

    /// A feature flag that disables this parameter when enabled in the
    /// runtime configuration.
    pub disabled_when: Option<&'static str>,
}

/// A calling-convention eligibility of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// The argument may only be supplied positionally.
    Positional,

    /// The argument may only be supplied by name.
    Named,

    /// The argument may be supplied either way.
    PositionalOrNamed,
}

impl ParamKind {
    /// Returns true if the argument may be supplied positionally.
    #[inline(always)]
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Positional | Self::PositionalOrNamed)
    }

    /// Returns true if the argument may be supplied by name.
    #[inline(always)]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named | Self::PositionalOrNamed)
    }
}

/// An immutable descriptor of one parameter of a
/// [native function](crate::runtime::NativeFn).
///
/// The descriptor is computed once, during the registration of the owning
/// function, from the [declaration](ParamDecl) and the runtime
/// [configuration](Semantics), and never changes afterwards.
#[derive(Clone, Debug)]
pub struct ParamMeta {
    name: &'static str,
    kind: ParamKind,
    default: Option<Value>,
    allowed: Box<[ValueClass]>,
    disabled_by: Option<&'static str>,
}

impl ParamMeta {
    /// Resolves a parameter declaration against the runtime configuration.
    ///
    /// ## Panics
    ///
    /// This function panics if the declared allowed class list is empty,
    /// which indicates a bug in the export system.
    pub(crate) fn new(decl: ParamDecl, semantics: &Semantics) -> Self {
        if decl.allowed.is_empty() {
            system_panic!(
                "Empty allowed class list of the \"{}\" parameter.",
                decl.name,
            );
        }

        let disabled_by = match decl.disabled_when {
            Some(flag) if semantics.is_enabled(flag) => Some(flag),
            _ => None,
        };

        Self {
            name: decl.name,
            kind: decl.kind,
            default: decl.default,
            allowed: decl.allowed.into_boxed_slice(),
            disabled_by,
        }
    }

    /// Returns the name of the parameter.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the calling-convention eligibility of the parameter.
    #[inline(always)]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns the parameter's default value, if the parameter is optional.
    #[inline(always)]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the list of value classes an argument must satisfy.
    #[inline(always)]
    pub fn allowed(&self) -> &[ValueClass] {
        &self.allowed
    }

    /// Returns true if the allowed class list contains the
    /// [Any](ValueClass::Any) sentinel, in which case arguments are not
    /// type-checked.
    #[inline(always)]
    pub fn accepts_any(&self) -> bool {
        self.allowed.contains(&ValueClass::Any)
    }

    /// Returns the flag that disabled this parameter under the registration
    /// configuration, if any.
    #[inline(always)]
    pub fn disabled_by_flag(&self) -> Option<&'static str> {
        self.disabled_by
    }

    /// Returns true if this parameter is disabled under the registration
    /// configuration. A disabled parameter behaves as if it were absent from
    /// the function signature: its argument slot is reserved, but the
    /// supplied value is always replaced with the default.
    #[inline(always)]
    pub fn is_disabled(&self) -> bool {
        self.disabled_by.is_some()
    }

    /// Returns true if an argument for this parameter must be supplied at
    /// every call site: the parameter has no default and is not disabled.
    #[inline(always)]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_disabled()
    }

    /// Returns true if the value satisfies this parameter's allowed class
    /// list.
    pub fn matches(&self, value: &Value) -> bool {
        self.allowed.iter().any(|class| value.is(*class))
    }

    /// Returns a description of the type(s) this parameter accepts, suitable
    /// for error messages (e.g., `"string or int"`).
    pub fn expected_description(&self) -> CompactString {
        let mut description = CompactString::default();

        for class in self.allowed.iter() {
            match description.is_empty() {
                true => (),
                false => description.push_str(" or "),
            }

            let _ = write!(&mut description, "{class}");
        }

        description
    }
}
