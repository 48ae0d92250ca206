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

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use ahash::AHashSet;
use lady_deirdre::sync::Lazy;

use crate::runtime::{Arena, RuntimeError, RuntimeResult};

/// A process-wide runtime configuration object.
///
/// The configuration consists of named feature flags. The export system
/// consults these flags once, during the registration of a
/// [native function](crate::runtime::NativeFn), to resolve the availability
/// of individual [parameters](crate::runtime::ParamMeta).
#[derive(Clone, Debug, Default)]
pub struct Semantics {
    flags: AHashSet<&'static str>,
}

impl Semantics {
    /// Creates a configuration with no enabled flags.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared configuration instance with no enabled flags.
    #[inline(always)]
    pub fn default_semantics() -> &'static Self {
        static DEFAULT: Lazy<Semantics> = Lazy::new(Semantics::new);

        &*DEFAULT
    }

    /// Enables the specified feature flag.
    #[inline(always)]
    pub fn with_flag(mut self, flag: &'static str) -> Self {
        let _ = self.flags.insert(flag);

        self
    }

    /// Returns true if the specified feature flag is enabled.
    #[inline(always)]
    pub fn is_enabled(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

/// An execution context of a script evaluation thread.
///
/// The binding layer does not inspect this object; it merely supplies it to
/// the native functions that [declared](crate::runtime::FnDecl::uses_thread)
/// an interest in it, and borrows its [Arena] to normalize native returns.
///
/// The context carries a shared cooperative cancellation flag. An external
/// thread may [interrupt](ThreadContext::interrupt) the evaluation at any
/// time; a long-running native function is expected to poll the flag through
/// the [check_interrupt](ThreadContext::check_interrupt) function and bail
/// out with the interruption error, which the binding layer propagates to the
/// evaluator untouched.
#[derive(Debug)]
pub struct ThreadContext {
    semantics: Semantics,
    arena: Arena,
    interrupt: Arc<AtomicBool>,
}

impl Default for ThreadContext {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Semantics::default_semantics().clone())
    }
}

impl ThreadContext {
    /// Creates a thread context with the specified configuration, an empty
    /// [Arena], and a cleared cancellation flag.
    #[inline(always)]
    pub fn new(semantics: Semantics) -> Self {
        Self {
            semantics,
            arena: Arena::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the configuration of this evaluation thread.
    #[inline(always)]
    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    /// Returns the allocation context of this evaluation thread.
    #[inline(always)]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the allocation context of this evaluation thread.
    #[inline(always)]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns a handle to the cancellation flag of this thread, through
    /// which another thread may request an interruption.
    #[inline(always)]
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Requests a cooperative interruption of the script evaluation.
    #[inline(always)]
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Returns true if an interruption has been requested.
    #[inline(always)]
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Returns the [interruption error](RuntimeError::Interrupted) if an
    /// interruption has been requested.
    #[inline(always)]
    pub fn check_interrupt(&self) -> RuntimeResult<()> {
        match self.is_interrupted() {
            true => Err(RuntimeError::Interrupted),
            false => Ok(()),
        }
    }
}
