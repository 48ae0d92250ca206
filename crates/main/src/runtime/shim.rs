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

use crate::{
    report::system_panic,
    runtime::{
        native::{FnFault, Invocation, RawFieldFn, RawMethodFn, RawReturn},
        Arena,
        ParamMeta,
        RuntimeError,
        RuntimeResult,
        Semantics,
        ThreadContext,
        Value,
        ValueClass,
    },
};

// The precomputed invocation path of a native function.
//
// The shim is assembled once, during the registration of the owning
// NativeFn, and reused by every call site afterwards. The fast path performs
// no lookups and allocates only when a default value is substituted or when
// the return conversion inherently requires it.
//
// The calling convention is encoded in the variant: a descriptor is either a
// plain method or a struct field, never both.
#[derive(Debug)]
pub(super) enum Shim {
    Method(MethodShim),
    Field(FieldShim),
}

impl Shim {
    pub(super) fn method(
        raw: RawMethodFn,
        params: &[ParamMeta],
        trailing: usize,
        uses_thread: bool,
        allow_return_nones: bool,
    ) -> Self {
        let plan = params.iter().map(SlotStep::new).collect();

        Self::Method(MethodShim {
            raw,
            plan,
            trailing,
            uses_thread,
            allow_return_nones,
        })
    }

    #[inline(always)]
    pub(super) fn field(raw: RawFieldFn, uses_semantics: bool, allow_return_nones: bool) -> Self {
        Self::Field(FieldShim {
            raw,
            uses_semantics,
            allow_return_nones,
        })
    }
}

#[derive(Debug)]
pub(super) struct MethodShim {
    raw: RawMethodFn,
    plan: Box<[SlotStep]>,
    trailing: usize,
    uses_thread: bool,
    allow_return_nones: bool,
}

impl MethodShim {
    pub(super) fn invoke(
        &self,
        function: &'static str,
        params: &[ParamMeta],
        receiver: &Value,
        thread: &mut ThreadContext,
        arguments: &mut [Option<Value>],
    ) -> RuntimeResult<Value> {
        if arguments.len() != self.plan.len() + self.trailing {
            shape_mismatch(
                function,
                &format!(
                    "expected {} argument slots, got {}",
                    self.plan.len() + self.trailing,
                    arguments.len(),
                ),
                receiver,
                arguments,
            );
        }

        for (index, step) in self.plan.iter().enumerate() {
            match step {
                SlotStep::Supply { default, check } => match &arguments[index] {
                    // Defaults come from the declaring function's author and
                    // are trusted: they bypass the type check.
                    None => arguments[index] = Some(default.clone()),

                    Some(value) => check.apply(function, &params[index], value)?,
                },

                SlotStep::Demand { check } => match &arguments[index] {
                    None => return Err(missing_arguments(function, params, arguments)),

                    Some(value) => check.apply(function, &params[index], value)?,
                },

                // The parameter is disabled under the registration
                // configuration: the slot is forced to the default no matter
                // what the call site supplied.
                SlotStep::Erase { default } => match default {
                    Some(value) => arguments[index] = Some(value.clone()),

                    None => return Err(missing_arguments(function, params, arguments)),
                },
            }
        }

        let outcome = (self.raw)(Invocation {
            receiver,
            thread: match self.uses_thread {
                true => Some(&mut *thread),
                false => None,
            },
            args: &mut *arguments,
        });

        match outcome {
            Ok(value) => normalize_return(
                function,
                self.allow_return_nones,
                value,
                thread.arena_mut(),
            ),

            Err(FnFault::Script(error)) => Err(error),

            Err(FnFault::Other(cause)) => Err(RuntimeError::NativeFault { function, cause }),

            Err(FnFault::Shape { details }) => {
                shape_mismatch(function, &details, receiver, arguments)
            }
        }
    }
}

#[derive(Debug)]
pub(super) struct FieldShim {
    raw: RawFieldFn,
    uses_semantics: bool,
    allow_return_nones: bool,
}

impl FieldShim {
    pub(super) fn invoke(
        &self,
        function: &'static str,
        receiver: &Value,
        semantics: &Semantics,
        arena: &mut Arena,
    ) -> RuntimeResult<Value> {
        let outcome = (self.raw)(
            receiver,
            match self.uses_semantics {
                true => Some(semantics),
                false => None,
            },
        );

        match outcome {
            Ok(value) => normalize_return(function, self.allow_return_nones, value, arena),

            Err(FnFault::Script(error)) => Err(error),

            Err(FnFault::Other(cause)) => Err(RuntimeError::NativeFault { function, cause }),

            Err(FnFault::Shape { details }) => shape_mismatch(function, &details, receiver, &[]),
        }
    }
}

// A validation step of one declared argument slot, fixed at registration
// time.
#[derive(Debug)]
enum SlotStep {
    // The parameter has a default value.
    Supply { default: Value, check: TypeCheck },

    // The parameter is required.
    Demand { check: TypeCheck },

    // The parameter is disabled under the registration configuration.
    Erase { default: Option<Value> },
}

impl SlotStep {
    fn new(param: &ParamMeta) -> Self {
        if param.is_disabled() {
            return Self::Erase {
                default: param.default_value().cloned(),
            };
        }

        let check = match param.accepts_any() {
            true => TypeCheck::Any,
            false => TypeCheck::OneOf(param.allowed().into()),
        };

        match param.default_value() {
            Some(default) => Self::Supply {
                default: default.clone(),
                check,
            },

            None => Self::Demand { check },
        }
    }
}

#[derive(Debug)]
enum TypeCheck {
    Any,
    OneOf(Box<[ValueClass]>),
}

impl TypeCheck {
    fn apply(
        &self,
        function: &'static str,
        param: &ParamMeta,
        value: &Value,
    ) -> RuntimeResult<()> {
        let classes = match self {
            Self::Any => return Ok(()),
            Self::OneOf(classes) => classes,
        };

        for class in classes.iter() {
            if value.is(*class) {
                return Ok(());
            }
        }

        Err(RuntimeError::TypeMismatch {
            function,
            parameter: param.name(),
            actual: value.class_name().into(),
            expected: param.expected_description(),
        })
    }
}

// The slow path of a failed argument-presence validation.
//
// Recomputes the full set of required-but-absent parameters so that the
// resulting error lists every missing name in declaration order. Missing
// positional parameters take priority over missing named-only parameters;
// exactly one of the two error forms is raised per failing call.
pub(super) fn missing_arguments(
    function: &'static str,
    params: &[ParamMeta],
    arguments: &[Option<Value>],
) -> RuntimeError {
    let mut positional = Vec::new();
    let mut named = Vec::new();

    for (param, slot) in params.iter().zip(arguments.iter()) {
        if slot.is_some() || !param.is_required() {
            continue;
        }

        match param.kind().is_positional() {
            true => positional.push(param.name()),
            false => named.push(param.name()),
        }
    }

    if !positional.is_empty() {
        return RuntimeError::MissingPositional {
            function,
            missing: positional,
        };
    }

    if !named.is_empty() {
        return RuntimeError::MissingNamed {
            function,
            missing: named,
        };
    }

    system_panic!("Missing-argument recheck of {function}() found no missing arguments.");
}

// Maps a raw native return onto the script value model.
fn normalize_return(
    function: &'static str,
    allow_return_nones: bool,
    value: RawReturn,
    arena: &mut Arena,
) -> RuntimeResult<Value> {
    match value {
        RawReturn::Void => Ok(Value::None),

        RawReturn::Embedded(Some(value)) => Ok(value),

        RawReturn::Int32(value) => Ok(Value::from(value)),

        RawReturn::Int64(value) => Ok(Value::from(value)),

        RawReturn::Host(Some(host)) => Ok(host.upcast(arena)),

        RawReturn::Embedded(None) | RawReturn::Host(None) => match allow_return_nones {
            true => Ok(Value::None),

            // A host-null return without the allow_return_nones permission is
            // a contract violation by the function's author, not a script
            // error.
            false => {
                system_panic!("Method {function}() invocation returned null.")
            }
        },
    }
}

// A "cannot happen" mismatch between the prebuilt shim and the underlying
// callable, indicating a registration-time defect. The diagnostic includes
// the representation and the dynamic type of the receiver and of every
// argument.
fn shape_mismatch(
    function: &'static str,
    details: &str,
    receiver: &Value,
    arguments: &[Option<Value>],
) -> ! {
    let mut buffer = String::new();

    let _ = write!(
        &mut buffer,
        "Call shim shape mismatch ({details}) in call of {function}(), receiver={} ({}), args=[",
        receiver.repr(),
        receiver.class_name(),
    );

    let mut separator = "";

    for slot in arguments {
        let _ = buffer.write_str(separator);

        match slot {
            None => {
                let _ = buffer.write_str("_");
            }

            Some(value) => {
                let _ = write!(&mut buffer, "{} ({})", value.repr(), value.class_name());
            }
        }

        separator = ", ";
    }

    let _ = buffer.write_str("].");

    system_panic!("{buffer}");
}
