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

//! # Ad Astra Native Bindings Crate
//!
//! This crate implements the native-call binding layer of the Ad Astra
//! scripting platform: the mechanism that connects exported Rust functions
//! and struct fields to the dynamically-typed script runtime.
//!
//! The export system (normally driven by the introspection macros) hands over
//! a declarative description of an exported function: its name, parameter
//! metadata, calling-convention flags, and a reference to the raw glue
//! callable. From this description, the crate builds a
//! [NativeFn](crate::runtime::NativeFn) descriptor with a precomputed call
//! shim: a reusable invocation path that validates arguments, substitutes
//! defaults, checks dynamic types, invokes the glue, and normalizes the
//! return value into the script value model.
//!
//! Descriptors are constructed once per exported function, typically during
//! single-threaded registration, and are immutable and freely shareable
//! between script evaluation threads afterwards.

pub use lady_deirdre;

mod report;

pub mod runtime;
