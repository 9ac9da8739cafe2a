//! Google API types.

pub mod rpc {
    //! `google.rpc`.

    /// gRPC status, carried in NACKs as `error_detail`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Status {
        /// Status code.
        #[prost(int32, tag = "1")]
        pub code: i32,
        /// Developer-facing message.
        #[prost(string, tag = "2")]
        pub message: ::prost::alloc::string::String,
        /// Details.
        #[prost(message, repeated, tag = "3")]
        pub details: ::prost::alloc::vec::Vec<::prost_types::Any>,
    }
}
