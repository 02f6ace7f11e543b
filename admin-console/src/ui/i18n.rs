//! Banner titles and messages in the console's display languages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Th,
    En,
}

/// Every text a banner can show. Backend-supplied messages take precedence
/// over these wherever the API returns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    SuccessTitle,
    /// Title used by the standalone add and edit pages.
    DoneTitle,
    ErrorTitle,
    ConnectFailedTitle,
    CannotConnect,
    ApiConnectFailed,
    LoadFailed,
    MissingFields,
    ToggleStatusOk,
    ToggleStatusFailed,
    DeleteUserOk,
    DeleteUserFailed,
    UpdateUserOk,
    UpdateUserFailed,
    CreateUserOk,
    CreateUserFailedTitle,
    CreateUserFailed,
    SaveUserOk,
    SaveUserFailedTitle,
    SaveUserFailed,
    PageToggleOk,
    PageToggleFailedTitle,
    PageToggleFailed,
    AssignRoleTitle,
    AssignRoleOk,
    AssignRoleFailedTitle,
    AssignRoleFailed,
    AssignRoleConnectFailed,
    CreateRoleOk,
    UpdateRoleOk,
    RoleActionFailed,
    CreatePermissionOk,
    UpdatePermissionOk,
    PermissionActionFailed,
    DeletePermissionOk,
    DeletePermissionFailed,
}

impl Locale {
    pub fn text(self, msg: Msg) -> &'static str {
        match self {
            Locale::Th => thai(msg),
            Locale::En => english(msg),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Th => "th",
            Locale::En => "en",
        }
    }
}

fn thai(msg: Msg) -> &'static str {
    match msg {
        Msg::SuccessTitle => "สำเร็จ",
        Msg::DoneTitle => "สำเร็จ!",
        Msg::ErrorTitle => "เกิดข้อผิดพลาด",
        Msg::ConnectFailedTitle => "เชื่อมต่อล้มเหลว",
        Msg::CannotConnect => "ไม่สามารถเชื่อมต่อกับเซิร์ฟเวอร์ได้",
        Msg::ApiConnectFailed => "เกิดข้อผิดพลาดในการเชื่อมต่อ API",
        Msg::LoadFailed => "ไม่สามารถโหลดข้อมูลได้",
        Msg::MissingFields => "กรุณากรอกข้อมูลให้ครบถ้วน",
        Msg::ToggleStatusOk => "เปลี่ยนสถานะผู้ใช้งานเรียบร้อยแล้ว",
        Msg::ToggleStatusFailed => "ไม่สามารถเปลี่ยนสถานะผู้ใช้งานได้",
        Msg::DeleteUserOk => "ลบผู้ใช้งานเรียบร้อยแล้ว",
        Msg::DeleteUserFailed => "ไม่สามารถลบผู้ใช้งานได้",
        Msg::UpdateUserOk => "แก้ไขข้อมูลผู้ใช้งานเรียบร้อยแล้ว",
        Msg::UpdateUserFailed => "ไม่สามารถแก้ไขข้อมูลผู้ใช้งานได้",
        Msg::CreateUserOk => "สร้างผู้ใช้ใหม่เรียบร้อยแล้ว",
        Msg::CreateUserFailedTitle => "สร้างผู้ใช้ล้มเหลว",
        Msg::CreateUserFailed => "เกิดข้อผิดพลาดในการสร้างผู้ใช้",
        Msg::SaveUserOk => "อัพเดทข้อมูลผู้ใช้เรียบร้อยแล้ว",
        Msg::SaveUserFailedTitle => "อัพเดทล้มเหลว",
        Msg::SaveUserFailed => "เกิดข้อผิดพลาดในการอัพเดทข้อมูล",
        Msg::PageToggleOk => "เปลี่ยนสถานะผู้ใช้เรียบร้อยแล้ว",
        Msg::PageToggleFailedTitle => "เปลี่ยนสถานะล้มเหลว",
        Msg::PageToggleFailed => "เกิดข้อผิดพลาดในการเปลี่ยนสถานะ",
        Msg::AssignRoleTitle => "Role สำเร็จ!",
        Msg::AssignRoleOk => "กำหนด Role ให้ผู้ใช้เรียบร้อยแล้ว",
        Msg::AssignRoleFailedTitle => "กำหนด Role ล้มเหลว",
        Msg::AssignRoleFailed => "เกิดข้อผิดพลาดในการกำหนด Role",
        Msg::AssignRoleConnectFailed => "เกิดข้อผิดพลาดในการเชื่อมต่อ API สำหรับกำหนด Role",
        Msg::CreateRoleOk => "เพิ่ม Role เรียบร้อยแล้ว",
        Msg::UpdateRoleOk => "แก้ไข Role เรียบร้อยแล้ว",
        Msg::RoleActionFailed => "ไม่สามารถบันทึก Role ได้",
        Msg::CreatePermissionOk => "เพิ่มข้อมูล Permission เรียบร้อยแล้ว",
        Msg::UpdatePermissionOk => "แก้ไขข้อมูล Permission เรียบร้อยแล้ว",
        Msg::PermissionActionFailed => "ไม่สามารถดำเนินการได้",
        Msg::DeletePermissionOk => "ลบ Permission เรียบร้อยแล้ว",
        Msg::DeletePermissionFailed => "ไม่สามารถลบ Permission ได้",
    }
}

fn english(msg: Msg) -> &'static str {
    match msg {
        Msg::SuccessTitle => "Success",
        Msg::DoneTitle => "Done!",
        Msg::ErrorTitle => "Something went wrong",
        Msg::ConnectFailedTitle => "Connection failed",
        Msg::CannotConnect => "Cannot connect to the server",
        Msg::ApiConnectFailed => "Could not reach the API",
        Msg::LoadFailed => "Could not load data",
        Msg::MissingFields => "Please fill in all required fields",
        Msg::ToggleStatusOk => "User status changed",
        Msg::ToggleStatusFailed => "Could not change the user's status",
        Msg::DeleteUserOk => "User deleted",
        Msg::DeleteUserFailed => "Could not delete the user",
        Msg::UpdateUserOk => "User updated",
        Msg::UpdateUserFailed => "Could not update the user",
        Msg::CreateUserOk => "User created",
        Msg::CreateUserFailedTitle => "User not created",
        Msg::CreateUserFailed => "Could not create the user",
        Msg::SaveUserOk => "User details saved",
        Msg::SaveUserFailedTitle => "Update failed",
        Msg::SaveUserFailed => "Could not save the user's details",
        Msg::PageToggleOk => "User status changed",
        Msg::PageToggleFailedTitle => "Status change failed",
        Msg::PageToggleFailed => "Could not change the status",
        Msg::AssignRoleTitle => "Role assigned",
        Msg::AssignRoleOk => "The role was assigned to the user",
        Msg::AssignRoleFailedTitle => "Role assignment failed",
        Msg::AssignRoleFailed => "Could not assign the role",
        Msg::AssignRoleConnectFailed => "Could not reach the API to assign the role",
        Msg::CreateRoleOk => "Role created",
        Msg::UpdateRoleOk => "Role updated",
        Msg::RoleActionFailed => "Could not save the role",
        Msg::CreatePermissionOk => "Permission created",
        Msg::UpdatePermissionOk => "Permission updated",
        Msg::PermissionActionFailed => "The action could not be completed",
        Msg::DeletePermissionOk => "Permission deleted",
        Msg::DeletePermissionFailed => "Could not delete the permission",
    }
}
