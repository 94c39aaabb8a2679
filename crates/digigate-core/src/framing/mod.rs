pub mod kiss;
