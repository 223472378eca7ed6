use flex_error::{define_error, TraceError};

define_error! {
    Error {
        Io
            [ TraceError<std::io::Error> ]
            |_| { "config I/O error" },

        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },

        Encode
            [ TraceError<toml::ser::Error> ]
            |_| { "invalid configuration" },

        EmptyChainId
            |_| { "chain configuration is missing its `id`" },

        DuplicateChain
            { chain_id: String }
            |e| { format!("chain '{}' is configured more than once", e.chain_id) },
    }
}
