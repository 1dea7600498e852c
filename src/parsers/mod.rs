pub mod grades;
pub mod login_form;
pub mod text_scan;
