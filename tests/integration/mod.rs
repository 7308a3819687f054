mod bulk_edit_pagination;
mod fixtures;
mod weight_template;
