mod user_dto;

pub use user_dto::{
    AdminUserDto, DeleteUserDto, DeleteUserResponseDto, UpdateUserRoleDto, UserRoleResponseDto,
};
