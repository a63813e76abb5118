// Property tests harness
mod arithmetic {
    include!("arithmetic.rs");
}
mod values {
    include!("values.rs");
}
