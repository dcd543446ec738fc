/*
 * Defines the visitor-facing strings shared by the `ui_description_layer`
 * (screen descriptions) and the `app_logic` (messages and export requests).
 * Keeping them here means the render side never has to know which phase it is
 * painting for.
 */

pub const APP_NAME: &str = "WalkupGallery";

pub const NEXT_LABEL: &str = "Next \u{2192}";
pub const FINISH_LABEL: &str = "Finish \u{2192}";

pub const EMPTY_GALLERY_MESSAGE: &str = "You did not include any works in your installation.";

pub const CONTENT_UNAVAILABLE_TITLE: &str = "This installation is resting";
pub const CONTENT_UNAVAILABLE_MESSAGE: &str =
    "The works could not be loaded. Please ask a member of staff for help.";

pub const EXPORT_FILE_STEM: &str = "my-installation";
pub const EXPORT_FAILED_MESSAGE: &str = "Export failed. You can take a screenshot instead.";
