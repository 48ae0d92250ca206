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
    fmt::{Display, Formatter},
    result::Result as StdResult,
    sync::Arc,
};

use compact_str::CompactString;

/// A result of a native function call, which can either be a normal value or
/// a [RuntimeError].
pub type RuntimeResult<T> = StdResult<T, RuntimeError>;

/// Represents any script-facing error that may occur during the invocation of
/// a [native function](crate::runtime::NativeFn).
///
/// This object implements the [Display] trait. The Display implementation
/// renders the canonical, user-facing error message. The exact wording of
/// these messages is a compatibility surface of the script runtime and is
/// covered by tests.
///
/// Defects of the export system itself (e.g., a call shim that does not match
/// its underlying callable) are never reported through this type. Such
/// defects indicate bugs in the host program and abort the operation loudly
/// instead.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RuntimeError {
    /// The script calls a function without supplying one or more required
    /// positional parameters.
    MissingPositional {
        /// The name of the called function.
        function: &'static str,

        /// The names of the missing parameters, in declaration order.
        missing: Vec<&'static str>,
    },

    /// The script calls a function without supplying one or more required
    /// named-only parameters.
    MissingNamed {
        /// The name of the called function.
        function: &'static str,

        /// The names of the missing parameters, in declaration order.
        missing: Vec<&'static str>,
    },

    /// The script supplies an argument whose dynamic type does not belong to
    /// the parameter's allowed class list.
    TypeMismatch {
        /// The name of the called function.
        function: &'static str,

        /// The name of the offending parameter.
        parameter: &'static str,

        /// The dynamic type name of the supplied value.
        actual: CompactString,

        /// A description of the type(s) the parameter accepts.
        expected: CompactString,
    },

    /// The underlying Rust callable failed with a host error that does not
    /// belong to the script value model.
    NativeFault {
        /// The name of the called function.
        function: &'static str,

        /// The original host failure.
        cause: Arc<dyn StdError + Send + Sync + 'static>,
    },

    /// The script evaluation has been interrupted by the evaluation thread's
    /// cooperative cancellation flag.
    Interrupted,
}

impl Display for RuntimeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPositional { function, missing } => {
                formatter.write_fmt(format_args!(
                    "{function}() missing {} required positional argument{}: {}",
                    missing.len(),
                    plural(missing.len()),
                    missing.join(", "),
                ))
            }

            Self::MissingNamed { function, missing } => formatter.write_fmt(format_args!(
                "{function}() missing {} required named argument{}: {}",
                missing.len(),
                plural(missing.len()),
                missing.join(", "),
            )),

            Self::TypeMismatch {
                function,
                parameter,
                actual,
                expected,
            } => formatter.write_fmt(format_args!(
                "in call to {function}(), parameter '{parameter}' got value of \
                type '{actual}', want '{expected}'",
            )),

            Self::NativeFault { cause, .. } => Display::fmt(cause, formatter),

            Self::Interrupted => formatter.write_str("script evaluation interrupted"),
        }
    }
}

impl StdError for RuntimeError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::NativeFault { cause, .. } => {
                let cause: &(dyn StdError + 'static) = cause.as_ref();

                Some(cause)
            }

            _ => None,
        }
    }
}

#[inline(always)]
fn plural(count: usize) -> &'static str {
    match count == 1 {
        true => "",
        false => "s",
    }
}
