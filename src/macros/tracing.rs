// Macros to instrument future spans.

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_instrument_internal {
    ($trace_type:ident; $fut:expr, $($element:expr),*) => {{
        #[cfg(feature = "tracing")]
        {
            $crate::tracing::Instrument::instrument($fut, $crate::tracing::$trace_type!($($element),*))
        }
        #[cfg(not(feature = "tracing"))]
        {
            $fut
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_instrument_trace {
    ($fut:expr, $($element:expr),*) => {{
        $crate::__strong_graphql_instrument_internal!(trace_span; $fut, $($element),*)
    }}
}

// Macros to instrument events.

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_trace_internal {
    ($trace_type:ident; $($element:expr),*) => {{
        #[cfg(feature = "tracing")]
        {
            $crate::tracing::$trace_type!($($element),*);
        }
        #[cfg(not(feature = "tracing"))]
        {
            $(let _ = &$element;)*
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_trace {
    ($($element:expr),*) => {{
        $crate::__strong_graphql_trace_internal!(trace; $($element),*)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_trace_debug {
    ($($element:expr),*) => {{
        $crate::__strong_graphql_trace_internal!(debug; $($element),*)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strong_graphql_trace_warn {
    ($($element:expr),*) => {{
        $crate::__strong_graphql_trace_internal!(warn; $($element),*)
    }};
}
