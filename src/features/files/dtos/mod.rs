mod file_dto;

pub use file_dto::{
    make_storage_key, parse_tags, sanitize_filename, ConfirmUploadDto, DashboardFileDto,
    DashboardQuery, FileCategory, FileResponseDto, FileSort, SignedUrlRequestDto,
    SignedUrlResponseDto, MAX_FILE_SIZE,
};
