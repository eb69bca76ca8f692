pub mod district;
pub mod hospital;
pub mod tehsil;
pub mod users;
