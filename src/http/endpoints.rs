//! Application paths the chain talks to.

pub const FORGOT_PASSWORD: &str = "/forgotpassword.php";
pub const FORGOT_USERNAME: &str = "/forgotusername.php";
pub const RESET_PASSWORD: &str = "/resetpassword.php";
pub const LOGIN: &str = "/login.php";
pub const PROFILE: &str = "/profile.php";
pub const UPDATE_MOTD: &str = "/admin/update_motd.php";
pub const UPLOAD_IMAGE: &str = "/admin/upload_image.php";
pub const IMPORT_USER: &str = "/admin/import_user.php";
pub const HOME: &str = "/";

/// Where an uploaded image is served from.
pub fn image_path(name: &str) -> String {
    format!("/images/{}", name)
}
