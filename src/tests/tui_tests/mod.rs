// TUI Tests Module - Testing the public tui module
// Tests organized by TUI module structure:
// - app_tests: App commands, event handling and snapshot refresh
// - screens_tests: ChatListScreen and ChatViewScreen
// - types_tests: Screen and Tab enums
// - ui_tests: UI helper functions and rendering into a test backend

mod screens_tests;
