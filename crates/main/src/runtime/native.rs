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

use std::{
    error::Error as StdError,
    fmt::{Debug, Formatter},
    sync::Arc,
};

use log::debug;

use crate::{
    report::system_panic,
    runtime::{
        shim::Shim,
        Arena,
        ParamDecl,
        ParamMeta,
        RuntimeError,
        RuntimeResult,
        Semantics,
        ThreadContext,
        Upcast,
        Value,
    },
};

/// A declarative description of an exported function or struct field.
///
/// The export system produces this object during the introspection of an
/// exported Rust item and hands it over to [NativeFn::new], which resolves it
/// into an immutable descriptor with a precomputed call shim.
#[derive(Clone, Debug)]
pub struct FnDecl {
    /// The script-facing name of the function.
    pub name: &'static str,

    /// The RustDoc documentation of the function.
    pub doc: &'static str,

    /// Whether the function should appear in the generated script
    /// documentation.
    pub documented: bool,

    /// Whether the receiver object itself is callable through this function.
    pub self_call: bool,

    /// The ordered parameter declarations. Declaration order is the
    /// positional order of the call frame.
    pub params: Vec<ParamDecl>,

    /// Whether the underlying callable additionally receives an overflow
    /// positional arguments collection in a trailing frame slot.
    pub extra_positionals: bool,

    /// Whether the underlying callable additionally receives an overflow
    /// keyword arguments mapping in a trailing frame slot.
    pub extra_keywords: bool,

    /// Whether a host-null return of the underlying callable maps to the
    /// script-level "none" value. Without this permission, a host-null
    /// return is treated as a bug of the function's author.
    pub allow_return_nones: bool,

    /// Whether the underlying callable wants the [ThreadContext] of the
    /// calling thread. When false, the call shim accepts and discards the
    /// context, so that every shim has an identical call shape.
    pub uses_thread: bool,

    /// Whether the underlying struct-field callable wants the [Semantics]
    /// object. When false, the call shim accepts and discards it.
    pub uses_semantics: bool,

    /// The raw glue callable. The variant selects the calling convention.
    pub callable: RawCallable,
}

/// A raw glue callable of an exported item.
///
/// The calling convention is a property of the exported item itself: a plain
/// method receives a call frame of arguments, whereas a struct field is
/// accessed through attribute syntax and receives none.
#[derive(Clone, Copy, Debug)]
pub enum RawCallable {
    /// A plain method.
    Method(RawMethodFn),

    /// A struct field accessor.
    Field(RawFieldFn),
}

/// The glue signature of a plain method.
pub type RawMethodFn = fn(Invocation<'_>) -> Result<RawReturn, FnFault>;

/// The glue signature of a struct field accessor.
///
/// The semantics argument is present only if the field
/// [declared](FnDecl::uses_semantics) an interest in it.
pub type RawFieldFn = fn(&Value, Option<&Semantics>) -> Result<RawReturn, FnFault>;

/// A resolved call frame handed to the glue callable of a plain method.
///
/// By the time the glue observes this object, every declared argument slot
/// has been validated by the call shim: absent slots are filled with
/// defaults, and present values satisfy the parameter allow-lists. The
/// trailing overflow slots (if the function accepts extra positional or
/// keyword arguments) are passed through unvalidated.
pub struct Invocation<'a> {
    /// The receiver object of the call. Never [Nil](Value::nil).
    pub receiver: &'a Value,

    /// The context of the calling thread, present only if the function
    /// [declared](FnDecl::uses_thread) an interest in it.
    pub thread: Option<&'a mut ThreadContext>,

    /// The resolved argument slots: one per declared parameter, in
    /// declaration order, followed by the overflow slots.
    pub args: &'a mut [Option<Value>],
}

/// A return value of a raw glue callable, prior to normalization into the
/// script value model.
pub enum RawReturn {
    /// The underlying function returns nothing. Normalizes to the
    /// script-level "none" value.
    Void,

    /// A return that is directly expressible in the script value model.
    /// `None` represents a host-null return, the handling of which is
    /// governed by the [allow_return_nones](FnDecl::allow_return_nones)
    /// permission.
    Embedded(Option<Value>),

    /// A 32-bit integer return.
    Int32(i32),

    /// A 64-bit integer return.
    Int64(i64),

    /// Any other host return. `Some` values pass through the [Upcast]
    /// conversion seam; `None` is a host-null return.
    Host(Option<Box<dyn Upcast>>),
}

impl Debug for RawReturn {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => formatter.write_str("Void"),
            Self::Embedded(value) => formatter.debug_tuple("Embedded").field(value).finish(),
            Self::Int32(value) => formatter.debug_tuple("Int32").field(value).finish(),
            Self::Int64(value) => formatter.debug_tuple("Int64").field(value).finish(),
            Self::Host(Some(..)) => formatter.write_str("Host(..)"),
            Self::Host(None) => formatter.write_str("Host(None)"),
        }
    }
}

/// A failure of a raw glue callable.
#[derive(Debug)]
pub enum FnFault {
    /// The resolved call frame does not match the shape the glue was
    /// compiled for. This "cannot happen" condition indicates a
    /// registration-time defect and aborts the operation with a detailed
    /// diagnostic.
    Shape {
        /// A description of the encountered discrepancy.
        details: String,
    },

    /// A script-facing error, including the
    /// [interruption](RuntimeError::Interrupted) signal. The call shim
    /// propagates this error to the evaluator untouched.
    Script(RuntimeError),

    /// Any other host failure. The call shim wraps it into
    /// [RuntimeError::NativeFault], so that the script never observes
    /// host-internal failure types directly.
    Other(Arc<dyn StdError + Send + Sync + 'static>),
}

impl FnFault {
    /// A convenient constructor of the [Shape](FnFault::Shape) fault.
    #[inline(always)]
    pub fn shape(details: impl Into<String>) -> Self {
        Self::Shape {
            details: details.into(),
        }
    }
}

/// An immutable descriptor of an exported Rust function or struct field.
///
/// The descriptor combines the declarative metadata of the exported item, the
/// resolved [parameter descriptors](ParamMeta), and a call shim precomputed
/// by [NativeFn::new]: a reusable invocation path that validates argument
/// presence and types, substitutes defaults, supplies the context objects the
/// underlying callable declared an interest in, and normalizes the return
/// value into the script [Value] model. Per-call work never involves
/// reflective lookups.
///
/// Descriptors are constructed once per exported item, typically during
/// single-threaded registration, and are immutable afterwards; an arbitrary
/// number of script evaluation threads may share one descriptor. Storing
/// descriptors in a static context is the expected usage:
///
/// ```rust
/// use ad_astra_bindings::{
///     lady_deirdre::sync::Lazy,
///     runtime::{
///         FnDecl,
///         FnFault,
///         Invocation,
///         NativeFn,
///         ParamDecl,
///         ParamKind,
///         RawCallable,
///         RawReturn,
///         Semantics,
///         ThreadContext,
///         Value,
///         ValueClass,
///     },
/// };
///
/// fn greet(invocation: Invocation) -> Result<RawReturn, FnFault> {
///     let [name] = invocation.args else {
///         return Err(FnFault::shape("one argument slot expected"));
///     };
///
///     let Some(Value::Str(name)) = name.take() else {
///         return Err(FnFault::shape("string argument expected"));
///     };
///
///     Ok(RawReturn::Embedded(Some(Value::from(format!(
///         "Hello, {name}"
///     )))))
/// }
///
/// static GREET: Lazy<NativeFn> = Lazy::new(|| {
///     NativeFn::new(
///         FnDecl {
///             name: "greet",
///             doc: "Greets the user.",
///             documented: true,
///             self_call: false,
///             params: vec![ParamDecl {
///                 name: "name",
///                 kind: ParamKind::PositionalOrNamed,
///                 default: None,
///                 allowed: vec![ValueClass::Str],
///                 disabled_when: None,
///             }],
///             extra_positionals: false,
///             extra_keywords: false,
///             allow_return_nones: false,
///             uses_thread: false,
///             uses_semantics: false,
///             callable: RawCallable::Method(greet),
///         },
///         Semantics::default_semantics(),
///     )
/// });
///
/// let mut thread = ThreadContext::default();
/// let mut frame = vec![Some(Value::from("Ann"))];
///
/// let result = GREET
///     .call(&Value::from("module"), &mut thread, &mut frame)
///     .unwrap();
///
/// assert_eq!(Value::from("Hello, Ann"), result);
/// ```
#[derive(Debug)]
pub struct NativeFn {
    name: &'static str,
    doc: &'static str,
    documented: bool,
    self_call: bool,
    params: Vec<ParamMeta>,
    extra_positionals: bool,
    extra_keywords: bool,
    allow_return_nones: bool,
    uses_thread: bool,
    uses_semantics: bool,
    shim: Shim,
}

impl NativeFn {
    /// Resolves a function declaration against the runtime configuration and
    /// builds the call shim.
    ///
    /// The configuration is consulted once, within this function: feature
    /// flags observed here decide the availability of individual parameters
    /// for the entire lifetime of the descriptor.
    ///
    /// ## Panics
    ///
    /// This function panics if the declaration is malformed: duplicate
    /// parameter names, an empty parameter allow-list, or a struct field
    /// declared with method parameters. These indicate bugs in the export
    /// system.
    pub fn new(decl: FnDecl, semantics: &Semantics) -> Self {
        let FnDecl {
            name,
            doc,
            documented,
            self_call,
            params,
            extra_positionals,
            extra_keywords,
            allow_return_nones,
            uses_thread,
            uses_semantics,
            callable,
        } = decl;

        for (index, param) in params.iter().enumerate() {
            if params[..index].iter().any(|other| other.name == param.name) {
                system_panic!(
                    "Duplicate \"{}\" parameter in the {name}() declaration.",
                    param.name,
                );
            }
        }

        let params = params
            .into_iter()
            .map(|param| ParamMeta::new(param, semantics))
            .collect::<Vec<_>>();

        let trailing = extra_positionals as usize + extra_keywords as usize;

        let shim = match callable {
            RawCallable::Method(raw) => {
                Shim::method(raw, &params, trailing, uses_thread, allow_return_nones)
            }

            RawCallable::Field(raw) => {
                if !params.is_empty() || trailing > 0 || uses_thread {
                    system_panic!("Struct field {name}() declared with method parameters.");
                }

                Shim::field(raw, uses_semantics, allow_return_nones)
            }
        };

        debug!("Native function {name}() registered.");

        Self {
            name,
            doc,
            documented,
            self_call,
            params,
            extra_positionals,
            extra_keywords,
            allow_return_nones,
            uses_thread,
            uses_semantics,
            shim,
        }
    }

    /// Invokes this plain method.
    ///
    /// The `arguments` call frame must consist of [frame_size](Self::frame_size)
    /// slots: one per declared parameter, in declaration order, followed by
    /// the overflow slots. A vacant slot represents an argument the call site
    /// did not supply.
    ///
    /// Script-facing validation failures and failures of the underlying
    /// callable are returned as [RuntimeError]; interruption signals
    /// propagate unchanged.
    ///
    /// ## Panics
    ///
    /// This function panics if the descriptor describes a
    /// [struct field](Self::is_struct_field), or if the `receiver` is
    /// [Nil](Value::nil). Both indicate bugs in the calling code.
    pub fn call(
        &self,
        receiver: &Value,
        thread: &mut ThreadContext,
        arguments: &mut [Option<Value>],
    ) -> RuntimeResult<Value> {
        let shim = match &self.shim {
            Shim::Method(shim) => shim,

            Shim::Field(..) => {
                system_panic!("An attempt to call the {}() struct field as a method.", self.name);
            }
        };

        if receiver.is_nil() {
            system_panic!("Nil receiver in the {}() method call.", self.name);
        }

        shim.invoke(self.name, &self.params, receiver, thread, arguments)
    }

    /// Invokes this struct field accessor.
    ///
    /// The `arena` is used if the underlying return value needs to be
    /// materialized as a new script object.
    ///
    /// ## Panics
    ///
    /// This function panics if the descriptor describes a plain method, or if
    /// the `receiver` is [Nil](Value::nil). Both indicate bugs in the calling
    /// code.
    pub fn call_field(
        &self,
        receiver: &Value,
        semantics: &Semantics,
        arena: &mut Arena,
    ) -> RuntimeResult<Value> {
        let shim = match &self.shim {
            Shim::Field(shim) => shim,

            Shim::Method(..) => {
                system_panic!("An attempt to call the {}() method as a struct field.", self.name);
            }
        };

        if receiver.is_nil() {
            system_panic!("Nil receiver in the {}() field access.", self.name);
        }

        shim.invoke(self.name, receiver, semantics, arena)
    }

    /// Returns the script-facing name of the function.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the RustDoc documentation of the function.
    #[inline(always)]
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Returns true if the function should appear in the generated script
    /// documentation.
    #[inline(always)]
    pub fn is_documented(&self) -> bool {
        self.documented
    }

    /// Returns true if the receiver object itself is callable through this
    /// function.
    #[inline(always)]
    pub fn is_self_call(&self) -> bool {
        self.self_call
    }

    /// Returns true if this descriptor describes a struct field accessor
    /// rather than a plain method.
    #[inline(always)]
    pub fn is_struct_field(&self) -> bool {
        matches!(&self.shim, Shim::Field(..))
    }

    /// Returns true if the underlying callable receives an overflow
    /// positional arguments collection.
    #[inline(always)]
    pub fn accepts_extra_args(&self) -> bool {
        self.extra_positionals
    }

    /// Returns true if the underlying callable receives an overflow keyword
    /// arguments mapping.
    #[inline(always)]
    pub fn accepts_extra_kwargs(&self) -> bool {
        self.extra_keywords
    }

    /// Returns true if a host-null return of the underlying callable maps to
    /// the script-level "none" value.
    #[inline(always)]
    pub fn allow_return_nones(&self) -> bool {
        self.allow_return_nones
    }

    /// Returns true if the underlying callable wants the [ThreadContext] of
    /// the calling thread.
    #[inline(always)]
    pub fn uses_thread(&self) -> bool {
        self.uses_thread
    }

    /// Returns true if the underlying struct-field callable wants the
    /// [Semantics] object.
    #[inline(always)]
    pub fn uses_semantics(&self) -> bool {
        self.uses_semantics
    }

    /// Returns the resolved parameter descriptors, in declaration order.
    #[inline(always)]
    pub fn params(&self) -> &[ParamMeta] {
        &self.params
    }

    /// Returns the index of the named parameter.
    ///
    /// Parameter lists are short; the lookup is a linear scan.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param.name() == name)
    }

    /// Returns the number of slots of this method's call frame: one per
    /// declared parameter, plus the overflow slots.
    #[inline(always)]
    pub fn frame_size(&self) -> usize {
        self.params.len() + self.extra_positionals as usize + self.extra_keywords as usize
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use compact_str::{CompactString, ToCompactString};

    use crate::runtime::{
        Arena,
        FnDecl,
        FnFault,
        Invocation,
        NativeFn,
        ParamDecl,
        ParamKind,
        RawCallable,
        RawMethodFn,
        RawReturn,
        RuntimeError,
        ScriptObject,
        Semantics,
        ThreadContext,
        Upcast,
        Value,
        ValueClass,
    };

    fn param(name: &'static str, allowed: Vec<ValueClass>) -> ParamDecl {
        ParamDecl {
            name,
            kind: ParamKind::PositionalOrNamed,
            default: None,
            allowed,
            disabled_when: None,
        }
    }

    fn method(name: &'static str, params: Vec<ParamDecl>, raw: RawMethodFn) -> FnDecl {
        FnDecl {
            name,
            doc: "",
            documented: false,
            self_call: false,
            params,
            extra_positionals: false,
            extra_keywords: false,
            allow_return_nones: false,
            uses_thread: false,
            uses_semantics: false,
            callable: RawCallable::Method(raw),
        }
    }

    fn greet_decl() -> FnDecl {
        fn raw(invocation: Invocation) -> Result<RawReturn, FnFault> {
            let [name, greeting] = invocation.args else {
                return Err(FnFault::shape("two argument slots expected"));
            };

            let (Some(Value::Str(name)), Some(Value::Str(greeting))) =
                (name.take(), greeting.take())
            else {
                return Err(FnFault::shape("string arguments expected"));
            };

            Ok(RawReturn::Embedded(Some(Value::from(format!(
                "{greeting}, {name}"
            )))))
        }

        method(
            "greet",
            vec![
                param("name", vec![ValueClass::Str]),
                ParamDecl {
                    default: Some(Value::from("Hello")),
                    ..param("greeting", vec![ValueClass::Str])
                },
            ],
            raw,
        )
    }

    fn void_raw(_invocation: Invocation) -> Result<RawReturn, FnFault> {
        Ok(RawReturn::Void)
    }

    fn receiver() -> Value {
        Value::from("module")
    }

    #[test]
    fn test_greet_call() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());
        let mut thread = ThreadContext::default();

        let mut frame = vec![Some(Value::from("Ann")), None];

        assert_eq!(
            Value::from("Hello, Ann"),
            greet.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );

        let mut frame = vec![Some(Value::from("Ann")), Some(Value::from("Hi"))];

        assert_eq!(
            Value::from("Hi, Ann"),
            greet.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    fn test_greet_missing_argument() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());
        let mut thread = ThreadContext::default();

        let mut frame = vec![None, None];

        let error = greet
            .call(&receiver(), &mut thread, &mut frame)
            .unwrap_err();

        assert_eq!(
            "greet() missing 1 required positional argument: name",
            error.to_string(),
        );
    }

    #[test]
    fn test_greet_type_mismatch() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());
        let mut thread = ThreadContext::default();

        let mut frame = vec![Some(Value::from(42)), None];

        let error = greet
            .call(&receiver(), &mut thread, &mut frame)
            .unwrap_err();

        assert_eq!(
            "in call to greet(), parameter 'name' got value of type 'int', want 'string'",
            error.to_string(),
        );
    }

    #[test]
    fn test_missing_arguments_in_declaration_order() {
        let probe = NativeFn::new(
            method(
                "probe",
                vec![
                    ParamDecl {
                        kind: ParamKind::Positional,
                        ..param("a", vec![ValueClass::Any])
                    },
                    ParamDecl {
                        kind: ParamKind::Positional,
                        ..param("b", vec![ValueClass::Any])
                    },
                    ParamDecl {
                        kind: ParamKind::Positional,
                        ..param("c", vec![ValueClass::Any])
                    },
                    ParamDecl {
                        kind: ParamKind::Named,
                        ..param("d", vec![ValueClass::Any])
                    },
                ],
                void_raw,
            ),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![None, None, None, None];

        let error = probe
            .call(&receiver(), &mut thread, &mut frame)
            .unwrap_err();

        // Missing positional parameters take priority: the missing named
        // parameter "d" is not mentioned.
        assert_eq!(
            "probe() missing 3 required positional arguments: a, b, c",
            error.to_string(),
        );
    }

    #[test]
    fn test_missing_named_arguments() {
        let probe = NativeFn::new(
            method(
                "probe",
                vec![
                    param("a", vec![ValueClass::Any]),
                    ParamDecl {
                        kind: ParamKind::Named,
                        ..param("d", vec![ValueClass::Any])
                    },
                    ParamDecl {
                        kind: ParamKind::Named,
                        ..param("e", vec![ValueClass::Any])
                    },
                ],
                void_raw,
            ),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![Some(Value::from(1)), None, None];

        let error = probe
            .call(&receiver(), &mut thread, &mut frame)
            .unwrap_err();

        assert_eq!(
            "probe() missing 2 required named arguments: d, e",
            error.to_string(),
        );
    }

    #[test]
    fn test_default_bypasses_type_check() {
        fn raw(invocation: Invocation) -> Result<RawReturn, FnFault> {
            let [slot] = invocation.args else {
                return Err(FnFault::shape("one argument slot expected"));
            };

            Ok(RawReturn::Embedded(slot.take()))
        }

        // The default value lies outside of the allowed class list. Defaults
        // are trusted and bypass the check.
        let probe = NativeFn::new(
            method(
                "probe",
                vec![ParamDecl {
                    default: Some(Value::from(100)),
                    ..param("limit", vec![ValueClass::Str])
                }],
                raw,
            ),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![None];

        assert_eq!(
            Value::from(100),
            probe.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    fn test_disabled_parameter_ignores_supplied_value() {
        let semantics = Semantics::new().with_flag("experimental_greetings");

        let greet = NativeFn::new(
            {
                let mut decl = greet_decl();

                decl.params[1].default = Some(Value::from("Hi"));
                decl.params[1].disabled_when = Some("experimental_greetings");

                decl
            },
            &semantics,
        );

        assert!(greet.params()[1].is_disabled());

        let mut thread = ThreadContext::new(semantics);

        // The supplied value of the disabled parameter is replaced with the
        // default, without type checking.
        let mut frame = vec![Some(Value::from("Ann")), Some(Value::from(7))];

        assert_eq!(
            Value::from("Hi, Ann"),
            greet.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    #[should_panic(expected = "found no missing arguments")]
    fn test_disabled_parameter_without_default_defect() {
        let semantics = Semantics::new().with_flag("experimental_greetings");

        let probe = NativeFn::new(
            method(
                "probe",
                vec![ParamDecl {
                    disabled_when: Some("experimental_greetings"),
                    ..param("value", vec![ValueClass::Any])
                }],
                void_raw,
            ),
            &semantics,
        );

        let mut thread = ThreadContext::new(semantics);
        let mut frame = vec![None];

        let _ = probe.call(&receiver(), &mut thread, &mut frame);
    }

    #[test]
    fn test_void_return() {
        let probe = NativeFn::new(
            method("probe", vec![], void_raw),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![];

        assert_eq!(
            Value::none(),
            probe.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    fn test_null_return_allowed() {
        fn raw(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Embedded(None))
        }

        let probe = NativeFn::new(
            FnDecl {
                allow_return_nones: true,
                ..method("probe", vec![], raw)
            },
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![];

        assert_eq!(
            Value::none(),
            probe.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    #[should_panic(expected = "returned null")]
    fn test_null_return_defect() {
        fn raw(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Embedded(None))
        }

        let probe = NativeFn::new(
            method("probe", vec![], raw),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![];

        let _ = probe.call(&receiver(), &mut thread, &mut frame);
    }

    #[derive(Debug)]
    struct Celsius(i64);

    impl ScriptObject for Celsius {
        fn class_name(&self) -> &'static str {
            "Celsius"
        }

        fn repr(&self) -> CompactString {
            self.0.to_compact_string()
        }
    }

    impl Upcast for Celsius {
        fn upcast(self: Box<Self>, arena: &mut Arena) -> Value {
            arena.alloc(Arc::new(*self))
        }
    }

    #[test]
    fn test_host_return_upcast() {
        fn raw(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Host(Some(Box::new(Celsius(100)))))
        }

        let probe = NativeFn::new(
            method("probe", vec![], raw),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();
        let mut frame = vec![];

        let result = probe.call(&receiver(), &mut thread, &mut frame).unwrap();

        assert_eq!("Celsius", result.class_name());
        assert_eq!(1, thread.arena().allocated());
    }

    #[test]
    fn test_integer_returns() {
        fn narrow(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Int32(7))
        }

        fn wide(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Int64(1 << 40))
        }

        let mut thread = ThreadContext::default();

        let probe = NativeFn::new(
            method("probe", vec![], narrow),
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(7),
            probe.call(&receiver(), &mut thread, &mut []).unwrap(),
        );

        let probe = NativeFn::new(
            method("probe", vec![], wide),
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(1i64 << 40),
            probe.call(&receiver(), &mut thread, &mut []).unwrap(),
        );
    }

    fn version_field(_receiver: &Value, _semantics: Option<&Semantics>) -> Result<RawReturn, FnFault> {
        Ok(RawReturn::Int32(3))
    }

    fn field(name: &'static str) -> FnDecl {
        FnDecl {
            name,
            doc: "",
            documented: false,
            self_call: false,
            params: vec![],
            extra_positionals: false,
            extra_keywords: false,
            allow_return_nones: false,
            uses_thread: false,
            uses_semantics: false,
            callable: RawCallable::Field(version_field),
        }
    }

    #[test]
    fn test_field_call() {
        let version = NativeFn::new(field("version"), Semantics::default_semantics());

        assert!(version.is_struct_field());

        let mut arena = Arena::new();

        assert_eq!(
            Value::from(3),
            version
                .call_field(&receiver(), Semantics::default_semantics(), &mut arena)
                .unwrap(),
        );
    }

    #[test]
    fn test_field_semantics_gating() {
        fn gated(_receiver: &Value, semantics: Option<&Semantics>) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Embedded(Some(Value::from(semantics.is_some()))))
        }

        let mut arena = Arena::new();

        let probe = NativeFn::new(
            FnDecl {
                callable: RawCallable::Field(gated),
                ..field("probe")
            },
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(false),
            probe
                .call_field(&receiver(), Semantics::default_semantics(), &mut arena)
                .unwrap(),
        );

        let probe = NativeFn::new(
            FnDecl {
                callable: RawCallable::Field(gated),
                uses_semantics: true,
                ..field("probe")
            },
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(true),
            probe
                .call_field(&receiver(), Semantics::default_semantics(), &mut arena)
                .unwrap(),
        );
    }

    #[test]
    #[should_panic(expected = "struct field as a method")]
    fn test_field_called_as_method_defect() {
        let version = NativeFn::new(field("version"), Semantics::default_semantics());

        let mut thread = ThreadContext::default();

        let _ = version.call(&receiver(), &mut thread, &mut []);
    }

    #[test]
    #[should_panic(expected = "method as a struct field")]
    fn test_method_called_as_field_defect() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());

        let mut arena = Arena::new();

        let _ = greet.call_field(&receiver(), Semantics::default_semantics(), &mut arena);
    }

    #[test]
    #[should_panic(expected = "Nil receiver")]
    fn test_nil_receiver_defect() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());

        let mut thread = ThreadContext::default();
        let mut frame = vec![Some(Value::from("Ann")), None];

        let _ = greet.call(&Value::nil(), &mut thread, &mut frame);
    }

    #[test]
    fn test_thread_context_gating() {
        fn observe(invocation: Invocation) -> Result<RawReturn, FnFault> {
            Ok(RawReturn::Embedded(Some(Value::from(
                invocation.thread.is_some(),
            ))))
        }

        let mut thread = ThreadContext::default();

        let probe = NativeFn::new(
            method("probe", vec![], observe),
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(false),
            probe.call(&receiver(), &mut thread, &mut []).unwrap(),
        );

        let probe = NativeFn::new(
            FnDecl {
                uses_thread: true,
                ..method("probe", vec![], observe)
            },
            Semantics::default_semantics(),
        );

        assert_eq!(
            Value::from(true),
            probe.call(&receiver(), &mut thread, &mut []).unwrap(),
        );
    }

    #[test]
    fn test_interruption_passes_through() {
        fn interruptible(invocation: Invocation) -> Result<RawReturn, FnFault> {
            let Some(thread) = invocation.thread else {
                return Err(FnFault::shape("thread context expected"));
            };

            match thread.check_interrupt() {
                Ok(()) => Ok(RawReturn::Void),
                Err(error) => Err(FnFault::Script(error)),
            }
        }

        let probe = NativeFn::new(
            FnDecl {
                uses_thread: true,
                ..method("probe", vec![], interruptible)
            },
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();

        assert_eq!(
            Value::none(),
            probe.call(&receiver(), &mut thread, &mut []).unwrap(),
        );

        thread.interrupt();

        assert!(matches!(
            probe.call(&receiver(), &mut thread, &mut []),
            Err(RuntimeError::Interrupted),
        ));
    }

    #[test]
    fn test_native_fault_wrapping() {
        fn failing(_invocation: Invocation) -> Result<RawReturn, FnFault> {
            Err(FnFault::Other(Arc::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk offline",
            ))))
        }

        let probe = NativeFn::new(
            method("probe", vec![], failing),
            Semantics::default_semantics(),
        );

        let mut thread = ThreadContext::default();

        let error = probe
            .call(&receiver(), &mut thread, &mut [])
            .unwrap_err();

        assert!(matches!(&error, RuntimeError::NativeFault { .. }));
        assert_eq!("disk offline", error.to_string());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_shape_mismatch_defect() {
        let greet = NativeFn::new(greet_decl(), Semantics::default_semantics());

        let mut thread = ThreadContext::default();

        // The frame is one slot short of the declared signature.
        let mut frame = vec![Some(Value::from("Ann"))];

        let _ = greet.call(&receiver(), &mut thread, &mut frame);
    }

    #[test]
    fn test_extras_pass_through() {
        fn raw(invocation: Invocation) -> Result<RawReturn, FnFault> {
            let [_, extras] = invocation.args else {
                return Err(FnFault::shape("two argument slots expected"));
            };

            Ok(RawReturn::Embedded(extras.take()))
        }

        let probe = NativeFn::new(
            FnDecl {
                extra_positionals: true,
                ..method("probe", vec![param("name", vec![ValueClass::Str])], raw)
            },
            Semantics::default_semantics(),
        );

        assert_eq!(2, probe.frame_size());

        let mut thread = ThreadContext::default();

        // The trailing overflow slot is not subject to validation.
        let mut frame = vec![Some(Value::from("Ann")), Some(Value::from(42))];

        assert_eq!(
            Value::from(42),
            probe.call(&receiver(), &mut thread, &mut frame).unwrap(),
        );
    }

    #[test]
    fn test_registration_idempotence() {
        let first = NativeFn::new(greet_decl(), Semantics::default_semantics());
        let second = NativeFn::new(greet_decl(), Semantics::default_semantics());

        let mut thread = ThreadContext::default();

        for greet in [&first, &second] {
            let mut frame = vec![Some(Value::from("Ann")), None];

            assert_eq!(
                Value::from("Hello, Ann"),
                greet.call(&receiver(), &mut thread, &mut frame).unwrap(),
            );

            let mut frame = vec![None, None];

            assert_eq!(
                "greet() missing 1 required positional argument: name",
                greet
                    .call(&receiver(), &mut thread, &mut frame)
                    .unwrap_err()
                    .to_string(),
            );
        }
    }

    #[test]
    #[should_panic(expected = "Duplicate")]
    fn test_duplicate_parameter_defect() {
        let _ = NativeFn::new(
            method(
                "probe",
                vec![
                    param("name", vec![ValueClass::Any]),
                    param("name", vec![ValueClass::Any]),
                ],
                void_raw,
            ),
            Semantics::default_semantics(),
        );
    }

    #[test]
    #[should_panic(expected = "declared with method parameters")]
    fn test_field_with_parameters_defect() {
        let _ = NativeFn::new(
            FnDecl {
                params: vec![param("name", vec![ValueClass::Any])],
                ..field("version")
            },
            Semantics::default_semantics(),
        );
    }

    #[test]
    fn test_descriptor_surface() {
        let greet = NativeFn::new(
            FnDecl {
                doc: "Greets the user.",
                documented: true,
                ..greet_decl()
            },
            Semantics::default_semantics(),
        );

        assert_eq!("greet", greet.name());
        assert_eq!("Greets the user.", greet.doc());
        assert!(greet.is_documented());
        assert!(!greet.is_self_call());
        assert!(!greet.is_struct_field());
        assert!(!greet.accepts_extra_args());
        assert!(!greet.accepts_extra_kwargs());
        assert!(!greet.allow_return_nones());
        assert!(!greet.uses_thread());
        assert_eq!(2, greet.frame_size());

        assert_eq!(Some(1), greet.param_index("greeting"));
        assert_eq!(None, greet.param_index("farewell"));
    }
}
