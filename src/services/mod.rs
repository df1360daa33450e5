pub mod axsrf;
