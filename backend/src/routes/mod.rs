pub mod dashboard;
pub mod distribution;
pub mod landing;
pub mod options;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        // Test that all route module constants are accessible
        assert_eq!(super::landing::LIST_SESSIONS, "/v1/sessions");
        assert_eq!(super::landing::SESSION, "/v1/sessions/{session_id}");
        assert_eq!(
            super::landing::SESSION_DATASET,
            "/v1/sessions/{session_id}/dataset"
        );
        assert_eq!(
            super::options::GET_OPTIONS,
            "/v1/sessions/{session_id}/options"
        );
        assert_eq!(
            super::dashboard::POST_DASHBOARD,
            "/v1/sessions/{session_id}/dashboard"
        );
        assert_eq!(
            super::dashboard::POST_OCCURRENCES,
            "/v1/sessions/{session_id}/occurrences"
        );
        assert_eq!(
            super::distribution::POST_DISTRIBUTION,
            "/v1/sessions/{session_id}/distribution"
        );
    }
}
