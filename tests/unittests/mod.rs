// Unit tests harness
mod values {
    include!("values.rs");
}
mod lowering {
    include!("lowering.rs");
}
mod config {
    include!("config.rs");
}
mod primitives {
    include!("primitives.rs");
}
