pub mod initials;
