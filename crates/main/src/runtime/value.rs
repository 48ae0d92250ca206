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
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use compact_str::{CompactString, ToCompactString};

use crate::runtime::Arena;

/// A dynamically-typed value of the script runtime.
///
/// This object is the hand-off format between the script evaluator and the
/// [native function](crate::runtime::NativeFn) binding layer: the evaluator
/// supplies call arguments as Values, and the binding layer normalizes every
/// native return into a Value.
///
/// The [Nil](Value::nil) value represents inaccessible data (e.g., an
/// argument slot of an object that has not been initialized yet). It is
/// distinct from [Value::None], which is the first-class "no value" object of
/// the script language itself.
///
/// Values are cheap to [Clone]: strings use small-string inlined storage, and
/// script objects are reference counted.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Inaccessible data. The [Default] value.
    #[default]
    Nil,

    /// The script-level "none" value.
    None,

    /// A boolean value.
    Bool(bool),

    /// An integer value.
    Int(i64),

    /// A string value.
    Str(CompactString),

    /// A first-class script object exported from Rust.
    Object(Arc<dyn ScriptObject>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::None, Self::None) => true,
            (Self::Bool(this), Self::Bool(other)) => this == other,
            (Self::Int(this), Self::Int(other)) => this == other,
            (Self::Str(this), Self::Str(other)) => this == other,
            (Self::Object(this), Self::Object(other)) => Arc::ptr_eq(this, other),
            _ => false,
        }
    }
}

impl From<i32> for Value {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for Value {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::Str(CompactString::from(value))
    }
}

impl From<String> for Value {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::Str(CompactString::from(value))
    }
}

impl Value {
    /// Creates a value that intentionally does not represent any data.
    #[inline(always)]
    pub const fn nil() -> Self {
        Self::Nil
    }

    /// Creates the script-level "none" value.
    #[inline(always)]
    pub const fn none() -> Self {
        Self::None
    }

    /// Returns true if this value is the [Nil](Value::nil) value.
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the user-facing name of this value's dynamic type, such as
    /// `"int"`, `"string"`, or `"NoneType"`.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::None => "NoneType",
            Self::Bool(..) => "bool",
            Self::Int(..) => "int",
            Self::Str(..) => "string",
            Self::Object(object) => object.class_name(),
        }
    }

    /// Returns true if this value's dynamic type belongs to the specified
    /// [class](ValueClass).
    ///
    /// The [ValueClass::Any] class matches every value.
    pub fn is(&self, class: ValueClass) -> bool {
        match (self, class) {
            (_, ValueClass::Any) => true,
            (Self::None, ValueClass::NoneClass) => true,
            (Self::Bool(..), ValueClass::Bool) => true,
            (Self::Int(..), ValueClass::Int) => true,
            (Self::Str(..), ValueClass::Str) => true,
            (Self::Object(object), ValueClass::Object(name)) => object.class_name() == name,
            _ => false,
        }
    }

    /// Returns the script-facing representation of this value, as the script
    /// author would write it in the source code (e.g., strings are quoted).
    pub fn repr(&self) -> CompactString {
        match self {
            Self::Nil => CompactString::new_inline("nil"),
            Self::None => CompactString::new_inline("None"),

            Self::Bool(value) => match value {
                true => CompactString::new_inline("True"),
                false => CompactString::new_inline("False"),
            },

            Self::Int(value) => value.to_compact_string(),
            Self::Str(value) => format!("{value:?}").into(),
            Self::Object(object) => object.repr(),
        }
    }
}

/// A class of dynamic values used in parameter allow-lists.
///
/// Each declared parameter of a [native function](crate::runtime::NativeFn)
/// carries a non-empty list of classes its argument must satisfy. The
/// [Any](ValueClass::Any) class is a sentinel that admits every value and
/// disables the check entirely.
///
/// The [Display] implementation prints the user-facing class name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueClass {
    /// The sentinel class that admits every value.
    Any,

    /// The class of the script-level "none" value.
    NoneClass,

    /// The class of boolean values.
    Bool,

    /// The class of integer values.
    Int,

    /// The class of string values.
    Str,

    /// The class of exported script objects with the specified
    /// [class name](ScriptObject::class_name).
    Object(&'static str),
}

impl Display for ValueClass {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => formatter.write_str("any value"),
            Self::NoneClass => formatter.write_str("NoneType"),
            Self::Bool => formatter.write_str("bool"),
            Self::Int => formatter.write_str("int"),
            Self::Str => formatter.write_str("string"),
            Self::Object(name) => formatter.write_str(name),
        }
    }
}

/// A first-class script object exported from Rust.
///
/// The script evaluator stores exported object payloads behind this trait.
/// The binding layer only consults the object's introspection surface: its
/// [class name](Self::class_name) for argument type checking and its
/// [representation](Self::repr) for diagnostics.
pub trait ScriptObject: Debug + Send + Sync + 'static {
    /// Returns the user-facing name of the object's script class.
    fn class_name(&self) -> &'static str;

    /// Returns the script-facing representation of the object.
    fn repr(&self) -> CompactString;
}

/// A host value that can be turned into a script [Value].
///
/// Native function returns that are not directly expressible in the script
/// value model pass through this conversion seam. The conversion receives the
/// [Arena] of the calling thread, because materializing a new script object
/// may require tracking its ownership.
pub trait Upcast: Send + Sync {
    /// Converts this host value into a script value, allocating through the
    /// provided `arena` if needed.
    fn upcast(self: Box<Self>, arena: &mut Arena) -> Value;
}
