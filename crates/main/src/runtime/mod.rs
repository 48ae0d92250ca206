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

//! Script runtime interfaces of the native binding layer.
//!
//! The central object of this module is [NativeFn]: an immutable descriptor
//! of an exported Rust function or struct field with a precomputed call shim.
//! The export system constructs a NativeFn once per exported item from a
//! [FnDecl] declaration, and the script evaluator invokes it through the
//! [NativeFn::call] and [NativeFn::call_field] entry points.
//!
//! The remaining objects of this module describe the seams between the
//! binding layer and its collaborators: the dynamic [Value] model, the
//! [Arena] allocation context, the [Semantics] runtime configuration, and
//! the [ThreadContext] of the evaluation thread.

mod error;
mod memory;
mod native;
mod param;
mod semantics;
mod shim;
mod value;

pub use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    memory::Arena,
    native::{
        FnDecl,
        FnFault,
        Invocation,
        NativeFn,
        RawCallable,
        RawFieldFn,
        RawMethodFn,
        RawReturn,
    },
    param::{ParamDecl, ParamKind, ParamMeta},
    semantics::{Semantics, ThreadContext},
    value::{ScriptObject, Upcast, Value, ValueClass},
};
