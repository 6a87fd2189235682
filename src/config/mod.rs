pub mod drr;
