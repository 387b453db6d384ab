pub mod yookassa;

pub use yookassa::YooKassaAdapter;
