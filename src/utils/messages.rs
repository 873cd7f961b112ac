//! Texts of the notifications shown after a workflow step.

pub const TAG_CREATE_ERROR: &str = "An error occured while creating tag";
pub const TAG_CREATE_SUCCESS: &str = "Tag created successfully";
pub const BOOK_CREATE_ERROR: &str = "An error occured while creating book";
pub const BOOK_CREATE_SUCCESS: &str = "Book created successfully";
pub const PURCHASE_ERROR: &str = "An error occured while purchasing book";
pub const PURCHASE_SUCCESS: &str = "Successfully purchased book";
pub const PUBLISHER_CREATE_ERROR: &str = "An error occured while creating publisher";
pub const PUBLISHER_CREATE_SUCCESS: &str = "Successfully added new publisher";
