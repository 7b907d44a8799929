//! Procedural macros for overcast.

use proc_macro::TokenStream;
use syn::{ItemFn, parse_macro_input};

mod overload;

/// Turn a typed function into a candidate constructor.
///
/// The annotated function is replaced by a function of the same name that
/// takes no arguments and returns an `overcast::Candidate`. The candidate's
/// scope is the module the function is declared in; each parameter becomes a
/// positional parameter of the same name:
///
/// | parameter    | declared as              | passed as                    |
/// |--------------|--------------------------|------------------------------|
/// | `x: &T`      | typed `T`                | borrowed from the bound value |
/// | `x: T`       | typed `T`                | a clone (`T: Clone`)          |
/// | `x: Value`   | untyped                  | the bound value               |
/// | `x: &Value`  | untyped                  | borrowed                      |
/// | `x: &[Value]`| variadic positional      | the surplus arguments         |
///
/// The return value is wrapped in a `Value`. A `Result` return maps its error
/// to the candidate's error. An `async fn` produces a suspending candidate.
///
/// # Options
///
/// - `name = "area"`: the operation name (defaults to the function name)
/// - `member = "Circle"`: declare the candidate as a member of `Circle`
/// - `collect`: submit the candidate with `inventory` for `Catalog::collected()`
/// - `order = 1`: position within a collected overload group
///
/// # Example
///
/// ```rust,ignore
/// #[overload(name = "area", collect)]
/// fn area_circle(shape: &Circle) -> f64 {
///     std::f64::consts::PI * shape.radius * shape.radius
/// }
///
/// let candidate: Candidate = area_circle();
/// ```
#[proc_macro_attribute]
pub fn overload(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as overload::OverloadArgs);
    let input = parse_macro_input!(item as ItemFn);

    overload::expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
