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

use std::sync::Arc;

use crate::{
    report::system_panic,
    runtime::{ScriptObject, Value},
};

/// An allocation context that tracks the ownership of script objects
/// materialized during evaluation.
///
/// Every value that the binding layer creates on behalf of a native function
/// return is allocated through the Arena of the calling thread. The owner of
/// the Arena (typically the evaluator) decides when the tracked objects
/// become unreachable.
///
/// A [frozen](Arena::freeze) Arena no longer admits allocations. Allocating
/// through a frozen Arena indicates a bug in the host program.
#[derive(Debug, Default)]
pub struct Arena {
    allocated: usize,
    frozen: bool,
}

impl Arena {
    /// Creates an empty unfrozen Arena.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes a script object within this Arena.
    ///
    /// ## Panics
    ///
    /// This function panics if the Arena is [frozen](Arena::freeze).
    pub fn alloc(&mut self, object: Arc<dyn ScriptObject>) -> Value {
        if self.frozen {
            system_panic!(
                "An attempt to allocate {} object in a frozen arena.",
                object.class_name(),
            );
        }

        self.allocated += 1;

        Value::Object(object)
    }

    /// Returns the number of objects materialized within this Arena.
    #[inline(always)]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Permanently forbids further allocations within this Arena.
    #[inline(always)]
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns true if this Arena has been [frozen](Arena::freeze).
    #[inline(always)]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
